//! Authentication and authorization logic.
//!
//! Provides password hashing, identity tokens and password-reset tokens,
//! shared by the account flows and the HTTP layer.

pub mod jwt;
pub mod password;
pub mod reset;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AuthError::Conflict(msg),
            StoreError::NotFound(msg) => AuthError::NotFound(msg),
            other => AuthError::Store(other),
        }
    }
}
