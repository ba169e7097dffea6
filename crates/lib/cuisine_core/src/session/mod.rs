//! Client-side session controller.
//!
//! Tracks whether a verified user is present and decides, on every route
//! change, whether the client should be redirected. The controller owns an
//! [`AuthBackend`] that talks to the API and a [`TokenStorage`] that persists
//! the bearer token, so the redirect rules run without a UI.
//!
//! ```text
//! Initializing ──initialize()──► Authenticated(user)   stored token verified
//!              └───────────────► Unauthenticated       no token / verify failed
//! Unauthenticated ──login()/signup()──► Authenticated(user)
//! Authenticated   ──logout()──────────► Unauthenticated
//! ```

pub mod http;
pub mod storage;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::auth::User;

pub use http::HttpAuthBackend;
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};

/// Where unauthenticated users are sent.
pub const SIGN_IN_ROUTE: &str = "/auth/signin";
/// Where authenticated users are sent when they open an auth page.
pub const HOME_ROUTE: &str = "/";
/// Prefix shared by sign-in, sign-up and password pages.
pub const AUTH_ROUTE_PREFIX: &str = "/auth";

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

/// A token together with the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Server operations the controller depends on.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Resolve a token to its user.
    async fn verify(&self, token: &str) -> Result<User, SessionError>;

    async fn login(&self, email: &str, password: &str) -> Result<AuthSession, SessionError>;

    async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SessionError>;
}

/// Session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated(User),
}

/// Result of a route change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Redirect(&'static str),
}

/// Whether `path` is one of the sign-in/sign-up pages.
pub fn is_auth_route(path: &str) -> bool {
    path == AUTH_ROUTE_PREFIX
        || path
            .strip_prefix(AUTH_ROUTE_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Redirect decision for `path` in `state`.
pub fn route_decision(state: &SessionState, path: &str) -> Navigation {
    match state {
        SessionState::Initializing => Navigation::Stay,
        SessionState::Unauthenticated if !is_auth_route(path) => {
            Navigation::Redirect(SIGN_IN_ROUTE)
        }
        SessionState::Authenticated(_) if is_auth_route(path) => Navigation::Redirect(HOME_ROUTE),
        _ => Navigation::Stay,
    }
}

/// Session controller.
pub struct SessionController<B, S> {
    backend: B,
    storage: S,
    state: SessionState,
}

impl<B: AuthBackend, S: TokenStorage> SessionController<B, S> {
    /// A controller in the `Initializing` state.
    pub fn new(backend: B, storage: S) -> Self {
        Self {
            backend,
            storage,
            state: SessionState::Initializing,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    /// The stored bearer token, for attaching to protected requests.
    pub fn token(&self) -> Option<String> {
        self.storage.load()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve the initial state from the persisted token. Any verification
    /// failure discards the token.
    pub async fn initialize(&mut self) -> &SessionState {
        self.state = match self.storage.load() {
            None => SessionState::Unauthenticated,
            Some(token) => match self.backend.verify(&token).await {
                Ok(user) => {
                    debug!(user_id = %user.id, "stored token verified");
                    SessionState::Authenticated(user)
                }
                Err(e) => {
                    debug!(error = %e, "stored token rejected, discarding");
                    self.discard_token();
                    SessionState::Unauthenticated
                }
            },
        };
        &self.state
    }

    /// Log in. On failure the state is left unchanged.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<User, SessionError> {
        let session = self.backend.login(email, password).await?;
        self.establish(session)
    }

    /// Sign up. On failure the state is left unchanged.
    pub async fn signup(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let session = self.backend.signup(username, email, password).await?;
        self.establish(session)
    }

    /// Discard the token and return to sign-in.
    pub fn logout(&mut self) -> Navigation {
        self.discard_token();
        self.state = SessionState::Unauthenticated;
        info!("logged out");
        Navigation::Redirect(SIGN_IN_ROUTE)
    }

    /// Replace the cached identity after a profile edit. Ignored unless
    /// authenticated.
    pub fn set_user(&mut self, user: User) {
        if let SessionState::Authenticated(current) = &mut self.state {
            *current = user;
        }
    }

    /// Redirect decision for a route change.
    pub fn navigate(&self, path: &str) -> Navigation {
        route_decision(&self.state, path)
    }

    fn establish(&mut self, session: AuthSession) -> Result<User, SessionError> {
        self.storage.save(&session.token)?;
        info!(user_id = %session.user.id, "session established");
        self.state = SessionState::Authenticated(session.user.clone());
        Ok(session.user)
    }

    fn discard_token(&self) {
        if let Err(e) = self.storage.clear() {
            debug!(error = %e, "failed to clear stored token");
        }
    }
}
