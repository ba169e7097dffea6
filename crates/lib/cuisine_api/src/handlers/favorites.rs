//! Favorites request handlers.

use axum::Json;
use axum::extract::State;
use cuisine_core::favorites;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{AddFavoriteRequest, FavoritesResponse, RemoveFavoriteQuery, SuccessResponse};

/// `GET /favorites` — saved meals in the order they were added.
pub async fn list_favorites_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<FavoritesResponse>> {
    let favorites = favorites::list(state.store.as_ref(), user.user_id()).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// `POST /favorites` — save a meal. Saving it again changes nothing.
pub async fn add_favorite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppJson(body): AppJson<AddFavoriteRequest>,
) -> AppResult<Json<SuccessResponse>> {
    favorites::add(
        state.store.as_ref(),
        user.user_id(),
        &body.meal_id,
        body.meal_data,
    )
    .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// `DELETE /favorites?mealId=..` — forget a saved meal.
pub async fn remove_favorite_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppQuery(query): AppQuery<RemoveFavoriteQuery>,
) -> AppResult<Json<SuccessResponse>> {
    favorites::remove(state.store.as_ref(), user.user_id(), &query.meal_id).await?;
    Ok(Json(SuccessResponse::ok()))
}
