//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::auth::{NewUser, ProfileUpdate, User, UserWithPassword};
use crate::models::favorites::FavoriteEntry;

type UserRow = (String, String, String, String);

fn user_from_row((id, username, email, avatar_url): UserRow) -> User {
    User {
        id,
        username,
        email,
        avatar_url,
    }
}

/// Map unique-index violations on `users.email` to `Conflict`.
fn conflict_on_unique(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return StoreError::Conflict("Email already registered".into());
    }
    StoreError::Db(e)
}

/// Map foreign-key violations on `favorites.user_id` to `NotFound`.
fn not_found_on_foreign_key(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.is_foreign_key_violation()
    {
        return StoreError::NotFound("User not found".into());
    }
    StoreError::Db(e)
}

/// Parse a user ID; a value that is not a UUID cannot name a stored user.
fn parse_user_id(user_id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(user_id).map_err(|_| StoreError::NotFound("User not found".into()))
}

/// [`UserStore`] backed by the `users` and `favorites` tables.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn user_exists(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert_user(&self, new_user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, username, email, password_hash, avatar_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id::text, username, email, avatar_url",
        )
        .bind(Uuid::now_v7())
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(conflict_on_unique)?;
        Ok(user_from_row(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserWithPassword>, StoreError> {
        let row = sqlx::query_as::<_, (String, String, String, String, String)>(
            "SELECT id::text, username, email, avatar_url, password_hash \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(
            |(id, username, email, avatar_url, password_hash)| UserWithPassword {
                user: user_from_row((id, username, email, avatar_url)),
                password_hash,
            },
        ))
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let Ok(id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id::text, username, email, avatar_url FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(user_from_row))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let Ok(id) = Uuid::parse_str(user_id) else {
            return Ok(None);
        };
        // NULL parameters leave the column unchanged.
        let row = sqlx::query_as::<_, UserRow>(
            "UPDATE users SET \
                 username = COALESCE($2, username), \
                 email = COALESCE($3, email) \
             WHERE id = $1 \
             RETURNING id::text, username, email, avatar_url",
        )
        .bind(id)
        .bind(update.username.as_deref())
        .bind(update.email.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(conflict_on_unique)?;
        Ok(row.map(user_from_row))
    }

    async fn set_reset_token(
        &self,
        user_id: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let id = parse_user_id(user_id)?;
        let result = sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("User not found".into()));
        }
        Ok(())
    }

    async fn consume_reset_token(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, StoreError> {
        let user_id = sqlx::query_scalar::<_, String>(
            "UPDATE users SET \
                 password_hash = $2, \
                 reset_token_hash = NULL, \
                 reset_token_expires_at = NULL \
             WHERE reset_token_hash = $1 AND reset_token_expires_at > $3 \
             RETURNING id::text",
        )
        .bind(token_hash)
        .bind(new_password_hash)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn list_favorites(&self, user_id: &str) -> Result<Vec<FavoriteEntry>, StoreError> {
        let id = parse_user_id(user_id)?;
        if !self.user_exists(id).await? {
            return Err(StoreError::NotFound("User not found".into()));
        }
        let rows = sqlx::query_as::<_, (String, sqlx::types::Json<Value>, DateTime<Utc>)>(
            "SELECT meal_id, meal_data, added_at FROM favorites \
             WHERE user_id = $1 \
             ORDER BY seq",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(meal_id, meal_data, added_at)| {
                let meal = match meal_data.0 {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                FavoriteEntry::new(meal_id, meal, added_at)
            })
            .collect())
    }

    async fn add_favorite(&self, user_id: &str, entry: FavoriteEntry) -> Result<bool, StoreError> {
        let id = parse_user_id(user_id)?;
        let result = sqlx::query(
            "INSERT INTO favorites (user_id, meal_id, meal_data, added_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, meal_id) DO NOTHING",
        )
        .bind(id)
        .bind(&entry.meal_id)
        .bind(sqlx::types::Json(Value::Object(entry.meal)))
        .bind(entry.added_at)
        .execute(&self.pool)
        .await
        .map_err(not_found_on_foreign_key)?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_favorite(&self, user_id: &str, meal_id: &str) -> Result<bool, StoreError> {
        let id = parse_user_id(user_id)?;
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND meal_id = $2")
            .bind(id)
            .bind(meal_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if !self.user_exists(id).await? {
            return Err(StoreError::NotFound("User not found".into()));
        }
        Ok(false)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
