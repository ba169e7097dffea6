//! Account flows over a [`UserStore`]: signup, login, profile edits and
//! password reset.

use std::sync::LazyLock;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::AuthError;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::reset::{ResetToken, hash_reset_token};
use crate::mail::{Mailer, reset_email};
use crate::models::auth::{NewUser, ProfileUpdate, User};
use crate::store::UserStore;

/// Acknowledgement returned by every password-reset request.
pub const RESET_ACKNOWLEDGEMENT: &str = "If the email exists, a reset link has been sent";

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Default avatar for a new user.
pub fn default_avatar_url(username: &str) -> String {
    let seed: String = url::form_urlencoded::byte_serialize(username.as_bytes()).collect();
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={seed}")
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::ValidationError(format!("{field} is required")));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    require_non_empty("Email", email)?;
    if !email.contains('@') {
        return Err(AuthError::ValidationError("Email is invalid".into()));
    }
    Ok(())
}

/// Register a new user. Fails with `Conflict` if the email is taken.
pub async fn create_user(
    store: &dyn UserStore,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    require_non_empty("Username", username)?;
    require_non_empty("Password", password)?;
    let email = normalize_email(email);
    validate_email(&email)?;
    let username = username.trim();

    if store.find_by_email(&email).await?.is_some() {
        return Err(AuthError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(password)?;
    let user = store
        .insert_user(NewUser {
            username: username.to_string(),
            email,
            password_hash,
            avatar_url: default_avatar_url(username),
        })
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Hash checked against when the email is unknown, so both login failures
/// pay for one bcrypt verify.
static DUMMY_PASSWORD_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("cuisine-quest-unknown-account").ok());

/// Check email + password. Unknown email and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let email = normalize_email(email);
    let Some(found) = store.find_by_email(&email).await? else {
        debug!(email = %email, "login for unknown email");
        if let Some(dummy) = DUMMY_PASSWORD_HASH.as_deref() {
            let _ = verify_password(password, dummy);
        }
        return Err(AuthError::CredentialError);
    };

    if !verify_password(password, &found.password_hash)? {
        debug!(user_id = %found.user.id, "login with wrong password");
        return Err(AuthError::CredentialError);
    }

    Ok(found.user)
}

/// Apply a partial profile update. Omitted fields stay unchanged; present
/// fields must be non-empty.
pub async fn update_profile(
    store: &dyn UserStore,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<User, AuthError> {
    let mut validated = ProfileUpdate::default();
    if let Some(username) = update.username {
        require_non_empty("Username", &username)?;
        validated.username = Some(username.trim().to_string());
    }
    if let Some(email) = update.email {
        let email = normalize_email(&email);
        validate_email(&email)?;
        validated.email = Some(email);
    }

    let user = if validated.is_empty() {
        store.find_by_id(user_id).await?
    } else {
        store.update_profile(user_id, &validated).await?
    };
    let user = user.ok_or_else(|| AuthError::NotFound("User not found".into()))?;

    info!(user_id = %user.id, "profile updated");
    Ok(user)
}

/// Start a password reset.
///
/// Always yields [`RESET_ACKNOWLEDGEMENT`]. For a registered email a fresh
/// reset token replaces any previous one and a link to
/// `<app_url>/auth/reset-password?token=..` is mailed. Failures are logged
/// and never reach the caller.
pub async fn request_password_reset(
    store: &dyn UserStore,
    mailer: &dyn Mailer,
    app_url: &str,
    email: &str,
) -> &'static str {
    let email = normalize_email(email);
    if let Err(e) = send_reset_link(store, mailer, app_url, &email).await {
        warn!(error = %e, "password reset request failed");
    }
    RESET_ACKNOWLEDGEMENT
}

async fn send_reset_link(
    store: &dyn UserStore,
    mailer: &dyn Mailer,
    app_url: &str,
    email: &str,
) -> Result<(), AuthError> {
    let Some(found) = store.find_by_email(email).await? else {
        debug!("password reset for unknown email");
        return Ok(());
    };

    let token = ResetToken::generate(Utc::now());
    store
        .set_reset_token(&found.user.id, &token.hash, token.expires_at)
        .await?;

    let reset_url = reset_url(app_url, &token.plaintext)?;
    mailer
        .send(reset_email(&found.user.username, &found.user.email, &reset_url))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?;

    info!(user_id = %found.user.id, "password reset link sent");
    Ok(())
}

fn reset_url(app_url: &str, token: &str) -> Result<String, AuthError> {
    let base = format!("{}/auth/reset-password", app_url.trim_end_matches('/'));
    let mut url = url::Url::parse(&base)
        .map_err(|e| AuthError::Internal(format!("invalid app url {app_url}: {e}")))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}

/// Finish a password reset. Tokens are single-use: success clears them, and
/// unknown, expired or already-used tokens are rejected.
pub async fn reset_password(
    store: &dyn UserStore,
    token: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    require_non_empty("Password", new_password)?;
    let invalid = || AuthError::ValidationError("Invalid or expired reset token".into());
    if token.trim().is_empty() {
        return Err(invalid());
    }

    let password_hash = hash_password(new_password)?;
    let user_id = store
        .consume_reset_token(&hash_reset_token(token.trim()), &password_hash, Utc::now())
        .await?
        .ok_or_else(invalid)?;

    info!(user_id = %user_id, "password reset completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::mail::{MailError, OutgoingMail};
    use crate::store::MemoryUserStore;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _mail: OutgoingMail) -> Result<(), MailError> {
            Err(MailError::Send("smtp down".into()))
        }
    }

    fn token_from_link(mail: &OutgoingMail) -> String {
        let start = mail.text.find("token=").expect("link in body") + "token=".len();
        mail.text[start..]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect()
    }

    #[tokio::test]
    async fn signup_then_login_returns_same_user() {
        let store = MemoryUserStore::new();
        let created = create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();
        let logged_in = authenticate(&store, "chef1@x.com", "pw12345").await.unwrap();
        assert_eq!(created.id, logged_in.id);
        assert_eq!(
            created.avatar_url,
            "https://api.dicebear.com/7.x/avataaars/svg?seed=chef1"
        );
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_regardless_of_password() {
        let store = MemoryUserStore::new();
        create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();
        for password in ["pw12345", "different"] {
            let err = create_user(&store, "other", "Chef1@X.com ", password)
                .await
                .unwrap_err();
            assert!(matches!(err, AuthError::Conflict(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let store = MemoryUserStore::new();
        create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();
        assert!(matches!(
            authenticate(&store, "chef1@x.com", "wrong").await,
            Err(AuthError::CredentialError)
        ));
        assert!(matches!(
            authenticate(&store, "nobody@x.com", "pw12345").await,
            Err(AuthError::CredentialError)
        ));
    }

    #[tokio::test]
    async fn unknown_email_still_runs_a_password_check() {
        let dummy = DUMMY_PASSWORD_HASH.as_deref().expect("dummy hash");
        assert!(dummy.starts_with("$2b$12$"));
        assert!(!verify_password("pw12345", dummy).unwrap());

        let store = MemoryUserStore::new();
        let started = std::time::Instant::now();
        let err = authenticate(&store, "nobody@x.com", "pw12345")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::CredentialError));

        // Skipping the verify would return in microseconds.
        let verify_started = std::time::Instant::now();
        verify_password("pw12345", dummy).unwrap();
        let one_verify = verify_started.elapsed();
        assert!(started.elapsed() >= one_verify / 4);
    }

    #[tokio::test]
    async fn signup_requires_all_fields() {
        let store = MemoryUserStore::new();
        for (username, email, password) in [
            ("", "a@x.com", "pw"),
            ("chef", "  ", "pw"),
            ("chef", "a@x.com", ""),
            ("chef", "not-an-email", "pw"),
        ] {
            assert!(matches!(
                create_user(&store, username, email, password).await,
                Err(AuthError::ValidationError(_))
            ));
        }
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn profile_update_is_partial() {
        let store = MemoryUserStore::new();
        let user = create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();

        let renamed = update_profile(
            &store,
            &user.id,
            ProfileUpdate {
                username: Some("Master Chef".into()),
                email: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.username, "Master Chef");
        assert_eq!(renamed.email, "chef1@x.com");
        assert_eq!(renamed.avatar_url, user.avatar_url);

        let unchanged = update_profile(&store, &user.id, ProfileUpdate::default())
            .await
            .unwrap();
        assert_eq!(unchanged, renamed);
    }

    #[tokio::test]
    async fn explicit_empty_field_is_rejected() {
        let store = MemoryUserStore::new();
        let user = create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();
        let err = update_profile(
            &store,
            &user.id,
            ProfileUpdate {
                username: Some(String::new()),
                email: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuthError::ValidationError(_)));
    }

    #[tokio::test]
    async fn profile_update_for_vanished_user_is_not_found() {
        let store = MemoryUserStore::new();
        let err = update_profile(&store, "gone", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_request_acknowledgement_does_not_leak_existence() {
        let store = MemoryUserStore::new();
        let mailer = RecordingMailer::default();
        create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();

        let known =
            request_password_reset(&store, &mailer, "http://localhost:3000", "chef1@x.com").await;
        let unknown =
            request_password_reset(&store, &mailer, "http://localhost:3000", "ghost@x.com").await;
        let failing =
            request_password_reset(&store, &FailingMailer, "http://localhost:3000", "chef1@x.com")
                .await;

        assert_eq!(known, unknown);
        assert_eq!(known, failing);
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reset_link_changes_password_once() {
        let store = MemoryUserStore::new();
        let mailer = RecordingMailer::default();
        let user = create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();

        request_password_reset(&store, &mailer, "http://localhost:3000/", "chef1@x.com").await;
        let mail = mailer.sent.lock().unwrap()[0].clone();
        assert_eq!(mail.to, "chef1@x.com");
        assert!(
            mail.text
                .contains("http://localhost:3000/auth/reset-password?token=")
        );
        let token = token_from_link(&mail);

        reset_password(&store, &token, "newpass1").await.unwrap();
        let logged_in = authenticate(&store, "chef1@x.com", "newpass1").await.unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(authenticate(&store, "chef1@x.com", "pw12345").await.is_err());

        let reused = reset_password(&store, &token, "again").await.unwrap_err();
        assert!(matches!(reused, AuthError::ValidationError(_)));
    }

    #[tokio::test]
    async fn new_reset_request_replaces_previous_token() {
        let store = MemoryUserStore::new();
        let mailer = RecordingMailer::default();
        create_user(&store, "chef1", "chef1@x.com", "pw12345")
            .await
            .unwrap();

        request_password_reset(&store, &mailer, "http://localhost:3000", "chef1@x.com").await;
        request_password_reset(&store, &mailer, "http://localhost:3000", "chef1@x.com").await;
        let (first, second) = {
            let sent = mailer.sent.lock().unwrap();
            (token_from_link(&sent[0]), token_from_link(&sent[1]))
        };

        assert!(reset_password(&store, &first, "newpass1").await.is_err());
        reset_password(&store, &second, "newpass1").await.unwrap();
    }
}
