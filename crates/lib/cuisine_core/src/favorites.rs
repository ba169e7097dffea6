//! Favorites registry — per-user set of saved meal IDs.
//!
//! Adding an already-saved meal is a no-op (the first snapshot is kept) and
//! removing an absent one succeeds, so concurrent add/remove from several
//! clients converge regardless of order.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::AuthError;
use crate::models::favorites::FavoriteEntry;
use crate::store::UserStore;

/// Favorites of a user in insertion order.
pub async fn list(store: &dyn UserStore, user_id: &str) -> Result<Vec<FavoriteEntry>, AuthError> {
    Ok(store.list_favorites(user_id).await?)
}

/// Save a meal with a snapshot of its metadata. `meal_data` must be a JSON
/// object, or null for no snapshot.
pub async fn add(
    store: &dyn UserStore,
    user_id: &str,
    meal_id: &str,
    meal_data: Value,
) -> Result<(), AuthError> {
    let meal_id = validate_meal_id(meal_id)?;
    let meal = match meal_data {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(AuthError::ValidationError(
                "mealData must be an object".into(),
            ));
        }
    };

    let added = store
        .add_favorite(user_id, FavoriteEntry::new(meal_id, meal, Utc::now()))
        .await?;
    debug!(user_id, meal_id, added, "favorite add");
    Ok(())
}

/// Forget a saved meal. Absent entries are ignored.
pub async fn remove(store: &dyn UserStore, user_id: &str, meal_id: &str) -> Result<(), AuthError> {
    let meal_id = validate_meal_id(meal_id)?;
    let removed = store.remove_favorite(user_id, meal_id).await?;
    debug!(user_id, meal_id, removed, "favorite remove");
    Ok(())
}

fn validate_meal_id(meal_id: &str) -> Result<&str, AuthError> {
    let meal_id = meal_id.trim();
    if meal_id.is_empty() {
        return Err(AuthError::ValidationError("mealId is required".into()));
    }
    Ok(meal_id)
}
