//! Authentication service: account flows delegating to `cuisine_core`, plus
//! token issuing for the responses.

use cuisine_core::accounts;
use cuisine_core::mail::Mailer;
use cuisine_core::models::auth::{ProfileUpdate, User};
use cuisine_core::store::UserStore;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, TokenResponse};

pub use cuisine_core::auth::jwt::{issue_token, resolve_jwt_secret_from, verify_token};
pub use cuisine_core::models::auth::TokenClaims;

fn build_token_response(user: User, jwt_secret: &[u8]) -> AppResult<TokenResponse> {
    let token = issue_token(&user.id, &user.email, jwt_secret)?;
    Ok(TokenResponse {
        token,
        user: AuthUser::from(user),
    })
}

/// Register a new account and sign it in.
pub async fn signup(
    store: &dyn UserStore,
    username: &str,
    email: &str,
    password: &str,
    jwt_secret: &[u8],
) -> AppResult<TokenResponse> {
    let user = accounts::create_user(store, username, email, password).await?;
    build_token_response(user, jwt_secret)
}

/// Authenticate with email + password.
pub async fn login(
    store: &dyn UserStore,
    email: &str,
    password: &str,
    jwt_secret: &[u8],
) -> AppResult<TokenResponse> {
    let user = accounts::authenticate(store, email, password).await?;
    info!(user_id = %user.id, "user logged in");
    build_token_response(user, jwt_secret)
}

/// Current identity behind a verified token. A token for a user that no
/// longer exists is treated as invalid.
pub async fn current_user(store: &dyn UserStore, user_id: &str) -> AppResult<AuthUser> {
    store
        .find_by_id(user_id)
        .await?
        .map(AuthUser::from)
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}

pub async fn update_profile(
    store: &dyn UserStore,
    user_id: &str,
    update: ProfileUpdate,
) -> AppResult<AuthUser> {
    let user = accounts::update_profile(store, user_id, update).await?;
    Ok(AuthUser::from(user))
}

/// Start a password reset. The reply never reveals whether the email is
/// registered.
pub async fn forgot_password(
    store: &dyn UserStore,
    mailer: &dyn Mailer,
    app_url: &str,
    email: &str,
) -> AppResult<&'static str> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    Ok(accounts::request_password_reset(store, mailer, app_url, email).await)
}

pub async fn reset_password(store: &dyn UserStore, token: &str, password: &str) -> AppResult<()> {
    accounts::reset_password(store, token, password).await?;
    Ok(())
}
