//! Password-reset tokens.
//!
//! The plaintext token only ever leaves the server inside the reset email;
//! the store keeps its SHA-256 digest.

use chrono::{DateTime, Duration, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};

/// Reset token lifetime: 1 hour.
pub const RESET_TOKEN_EXPIRY_SECS: i64 = 60 * 60;

/// A freshly generated reset token.
#[derive(Debug, Clone)]
pub struct ResetToken {
    /// Sent to the user.
    pub plaintext: String,
    /// Persisted.
    pub hash: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    /// Generate a random token expiring one hour after `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let plaintext: String = rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        let hash = hash_reset_token(&plaintext);
        Self {
            plaintext,
            hash,
            expires_at: now + Duration::seconds(RESET_TOKEN_EXPIRY_SECS),
        }
    }
}

/// SHA-256 hash a reset token for storage.
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_unique_and_hashed() {
        let now = Utc::now();
        let a = ResetToken::generate(now);
        let b = ResetToken::generate(now);
        assert_eq!(a.plaintext.len(), 64);
        assert_ne!(a.plaintext, b.plaintext);
        assert_eq!(a.hash, hash_reset_token(&a.plaintext));
        assert_eq!(a.hash.len(), 64);
        assert_eq!(a.expires_at - now, Duration::hours(1));
    }
}
