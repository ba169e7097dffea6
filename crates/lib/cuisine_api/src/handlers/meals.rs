//! TheMealDB passthrough handlers. Upstream failures come back as empty
//! results.

use axum::Json;
use axum::extract::{Path, State};

use crate::AppState;
use crate::extract::AppQuery;
use crate::models::{MealResponse, MealSearchQuery, MealsResponse, RandomMealsQuery};

/// Meals returned by `/meals/random` without a `count`.
pub const DEFAULT_RANDOM_COUNT: usize = 3;

/// `GET /meals/search?name=..`
pub async fn search_handler(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<MealSearchQuery>,
) -> Json<MealsResponse> {
    let meals = state.meals.search_by_name(query.name.trim()).await;
    Json(MealsResponse { meals })
}

/// `GET /meals/letter/{letter}`
pub async fn by_letter_handler(
    State(state): State<AppState>,
    Path(letter): Path<String>,
) -> Json<MealsResponse> {
    let meals = state.meals.by_first_letter(&letter).await;
    Json(MealsResponse { meals })
}

/// `GET /meals/random?count=..`
pub async fn random_handler(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RandomMealsQuery>,
) -> Json<MealsResponse> {
    let count = query.count.unwrap_or(DEFAULT_RANDOM_COUNT);
    let meals = state.meals.random_many(count).await;
    Json(MealsResponse { meals })
}

/// `GET /meals/{id}`
pub async fn by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<MealResponse> {
    let meal = state.meals.by_id(&id).await;
    Json(MealResponse { meal })
}
