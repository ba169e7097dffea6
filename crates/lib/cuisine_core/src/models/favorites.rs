//! Favorite recipe entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A saved recipe reference with the metadata snapshot taken when it was added.
///
/// Serializes flattened: `{"mealId": .., <snapshot fields>.., "addedAt": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEntry {
    pub meal_id: String,
    #[serde(flatten)]
    pub meal: Map<String, Value>,
    pub added_at: DateTime<Utc>,
}

impl FavoriteEntry {
    /// Build an entry, dropping snapshot keys that would shadow `mealId` or
    /// `addedAt` once flattened.
    pub fn new(
        meal_id: impl Into<String>,
        mut meal: Map<String, Value>,
        added_at: DateTime<Utc>,
    ) -> Self {
        meal.remove("mealId");
        meal.remove("addedAt");
        Self {
            meal_id: meal_id.into(),
            meal,
            added_at,
        }
    }
}
