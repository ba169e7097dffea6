//! Credential store — persisted users and their favorites.
//!
//! [`UserStore`] is the seam between the account/favorites logic and the
//! backing database. [`PgUserStore`] is the production backend;
//! [`MemoryUserStore`] has the same semantics and backs tests and
//! `--memory-store` development runs.
//!
//! Backend contract:
//! - emails are unique; inserting or updating to a taken email is `Conflict`
//! - favorites are a set keyed by meal ID, listed in insertion order
//! - adding an existing favorite keeps the first snapshot
//! - removing an absent favorite succeeds
//! - operations on an unknown user ID are `NotFound`

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::auth::{NewUser, ProfileUpdate, User, UserWithPassword};
use crate::models::favorites::FavoriteEntry;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persisted users and favorites.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with `Conflict` if the email is taken.
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Look up a user (with password hash) by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError>;

    /// Look up a user by ID.
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Apply a validated partial update. Returns `None` if the user does not exist.
    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError>;

    /// Store a reset token hash, replacing any previous one.
    async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Replace the password of the user holding a live reset token and clear
    /// the token. Returns the user ID, or `None` when no unexpired token
    /// matches.
    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StoreError>;

    /// Favorites in insertion order.
    async fn list_favorites(&self, user_id: &str) -> Result<Vec<FavoriteEntry>, StoreError>;

    /// Insert a favorite unless one with the same meal ID exists.
    /// Returns whether a new entry was added.
    async fn add_favorite(&self, user_id: &str, entry: FavoriteEntry) -> Result<bool, StoreError>;

    /// Delete a favorite. Returns whether an entry was removed.
    async fn remove_favorite(&self, user_id: &str, meal_id: &str) -> Result<bool, StoreError>;

    /// Whether the backend is reachable.
    async fn ping(&self) -> bool;
}
