//! Identity token generation and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Identity token lifetime: 7 days.
pub const TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 60 * 60;

/// Generate a signed identity token (HS256, 7 day expiry) issued now.
pub fn issue_token(user_id: &str, email: &str, secret: &[u8]) -> Result<String, AuthError> {
    issue_token_at(user_id, email, secret, Utc::now())
}

/// Generate a signed identity token issued at `now`.
pub fn issue_token_at(
    user_id: &str,
    email: &str,
    secret: &[u8],
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let claims = TokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + Duration::seconds(TOKEN_EXPIRY_SECS)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify an identity token, returning the claims on success.
///
/// Expiry is checked without leeway: a token is rejected from its `exp`
/// second onward.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenError(format!("invalid or expired token: {e}")))
}

/// Resolve the signing secret: env var `JWT_SECRET` → `AUTH_SECRET`.
///
/// Fails when neither is set to a non-empty value. There is no built-in
/// fallback secret.
pub fn resolve_jwt_secret() -> Result<String, AuthError> {
    resolve_jwt_secret_from(|var| std::env::var(var).ok())
}

/// [`resolve_jwt_secret`] over an arbitrary variable lookup.
pub fn resolve_jwt_secret_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, AuthError> {
    for var in ["JWT_SECRET", "AUTH_SECRET"] {
        if let Some(secret) = lookup(var)
            && !secret.trim().is_empty()
        {
            return Ok(secret);
        }
    }
    Err(AuthError::Config(
        "JWT_SECRET (or AUTH_SECRET) must be set".into(),
    ))
}
