//! TheMealDB client.
//!
//! Read-only lookups against the public recipe API. Upstream failures are
//! never surfaced: they are logged and the caller gets an empty result, the
//! same as "no matches".

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::meal::Meal;

/// Public TheMealDB v1 endpoint.
pub const DEFAULT_MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// Upper bound for `random_many`.
pub const MAX_RANDOM_MEALS: usize = 12;

/// Errors talking to the upstream API.
#[derive(Debug, Error)]
pub enum MealError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

#[derive(Deserialize)]
struct MealResponse {
    meals: Option<Vec<Meal>>,
}

/// TheMealDB client.
#[derive(Debug, Clone)]
pub struct MealClient {
    client: Client,
    base_url: String,
}

impl MealClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Meals whose name contains `name`.
    pub async fn search_by_name(&self, name: &str) -> Vec<Meal> {
        self.fetch_or_empty("search.php", &[("s", name)]).await
    }

    /// Meals whose name starts with `letter`. Anything other than a single
    /// ASCII letter matches nothing.
    pub async fn by_first_letter(&self, letter: &str) -> Vec<Meal> {
        let mut chars = letter.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Vec::new();
        };
        if !c.is_ascii_alphabetic() {
            return Vec::new();
        }
        let letter = c.to_ascii_lowercase().to_string();
        self.fetch_or_empty("search.php", &[("f", letter.as_str())])
            .await
    }

    /// A single meal by upstream ID.
    pub async fn by_id(&self, id: &str) -> Option<Meal> {
        if id.trim().is_empty() {
            return None;
        }
        self.fetch_or_empty("lookup.php", &[("i", id.trim())])
            .await
            .into_iter()
            .next()
    }

    /// One random meal.
    pub async fn random(&self) -> Option<Meal> {
        self.fetch_or_empty("random.php", &[]).await.into_iter().next()
    }

    /// Up to `count` random meals (capped at [`MAX_RANDOM_MEALS`]), fetched
    /// one request at a time. Failed draws are skipped.
    pub async fn random_many(&self, count: usize) -> Vec<Meal> {
        let mut meals = Vec::new();
        for _ in 0..count.min(MAX_RANDOM_MEALS) {
            if let Some(meal) = self.random().await {
                meals.push(meal);
            }
        }
        meals
    }

    async fn fetch_or_empty(&self, endpoint: &str, query: &[(&str, &str)]) -> Vec<Meal> {
        match self.fetch(endpoint, query).await {
            Ok(meals) => meals,
            Err(e) => {
                warn!(endpoint, error = %e, "meal lookup failed");
                Vec::new()
            }
        }
    }

    async fn fetch(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Vec<Meal>, MealError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| MealError::UpstreamUnavailable(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(MealError::UpstreamUnavailable(format!(
                "{endpoint} returned {}",
                resp.status()
            )));
        }

        let data: MealResponse = resp
            .json()
            .await
            .map_err(|e| MealError::UpstreamUnavailable(format!("response parse error: {e}")))?;

        Ok(data.meals.unwrap_or_default())
    }
}
