//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::auth::{NewUser, ProfileUpdate, User, UserWithPassword};
use crate::models::favorites::FavoriteEntry;

#[derive(Debug, Clone)]
struct UserRecord {
    user: User,
    password_hash: String,
    favorites: Vec<FavoriteEntry>,
    reset_token_hash: Option<String>,
    reset_token_expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<String, UserRecord>,
    /// email → user ID
    emails: HashMap<String, String>,
}

/// [`UserStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }

    /// Current reset-token state of a user: (hash, expiry).
    pub async fn reset_token_of(
        &self,
        user_id: &str,
    ) -> Option<(Option<String>, Option<DateTime<Utc>>)> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(user_id)
            .map(|r| (r.reset_token_hash.clone(), r.reset_token_expires_at))
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.emails.contains_key(&new_user.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }
        let user = User {
            id: Uuid::now_v7().to_string(),
            username: new_user.username,
            email: new_user.email,
            avatar_url: new_user.avatar_url,
        };
        inner.emails.insert(user.email.clone(), user.id.clone());
        inner.users.insert(
            user.id.clone(),
            UserRecord {
                user: user.clone(),
                password_hash: new_user.password_hash,
                favorites: Vec::new(),
                reset_token_hash: None,
                reset_token_expires_at: None,
            },
        );
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError> {
        let inner = self.inner.read().await;
        let found = inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .map(|r| UserWithPassword {
                user: r.user.clone(),
                password_hash: r.password_hash.clone(),
            });
        Ok(found)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(user_id).map(|r| r.user.clone()))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(current_email) = inner.users.get(user_id).map(|r| r.user.email.clone()) else {
            return Ok(None);
        };

        if let Some(email) = &update.email
            && *email != current_email
        {
            if inner.emails.contains_key(email) {
                return Err(StoreError::Conflict("Email already registered".into()));
            }
            inner.emails.remove(&current_email);
            inner.emails.insert(email.clone(), user_id.to_string());
        }

        let Some(record) = inner.users.get_mut(user_id) else {
            return Ok(None);
        };
        if let Some(username) = &update.username {
            record.user.username = username.clone();
        }
        if let Some(email) = &update.email {
            record.user.email = email.clone();
        }
        Ok(Some(record.user.clone()))
    }

    async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound("User not found".into()))?;
        record.reset_token_hash = Some(token_hash.to_string());
        record.reset_token_expires_at = Some(expires_at);
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner.users.values_mut().find(|r| {
            r.reset_token_hash.as_deref() == Some(token_hash)
                && r.reset_token_expires_at.is_some_and(|exp| exp > now)
        });
        Ok(record.map(|r| {
            r.password_hash = new_password_hash.to_string();
            r.reset_token_hash = None;
            r.reset_token_expires_at = None;
            r.user.id.clone()
        }))
    }

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<FavoriteEntry>, StoreError> {
        let inner = self.inner.read().await;
        inner
            .users
            .get(user_id)
            .map(|r| r.favorites.clone())
            .ok_or_else(|| StoreError::NotFound("User not found".into()))
    }

    async fn add_favorite(&self, user_id: &str, entry: FavoriteEntry) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound("User not found".into()))?;
        if record.favorites.iter().any(|f| f.meal_id == entry.meal_id) {
            return Ok(false);
        }
        record.favorites.push(entry);
        Ok(true)
    }

    async fn remove_favorite(&self, user_id: &str, meal_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let record = inner
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound("User not found".into()))?;
        let before = record.favorites.len();
        record.favorites.retain(|f| f.meal_id != meal_id);
        Ok(record.favorites.len() != before)
    }

    async fn ping(&self) -> bool {
        true
    }
}
