//! Profile request handlers.

use axum::Json;
use axum::extract::State;
use cuisine_core::models::auth::ProfileUpdate;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{ProfileUpdateRequest, UserResponse};
use crate::services::auth;

/// `PUT /profile` — change username and/or email.
pub async fn update_profile_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    AppJson(body): AppJson<ProfileUpdateRequest>,
) -> AppResult<Json<UserResponse>> {
    let update = ProfileUpdate {
        username: body.username,
        email: body.email,
    };
    let user = auth::update_profile(state.store.as_ref(), user.user_id(), update).await?;
    Ok(Json(UserResponse { user }))
}
