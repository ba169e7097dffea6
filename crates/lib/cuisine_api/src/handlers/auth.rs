//! Authentication request handlers.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ForgotPasswordRequest, LoginRequest, MessageResponse, ResetPasswordRequest, SignupRequest,
    SuccessResponse, TokenResponse, UserResponse,
};
use crate::services::auth;

/// `POST /signup` — create an account and return a token for it.
pub async fn signup_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<SignupRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::signup(
        state.store.as_ref(),
        &body.username,
        &body.email,
        &body.password,
        state.config.jwt_secret.as_bytes(),
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /login` — authenticate with email + password.
pub async fn login_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(
        state.store.as_ref(),
        &body.email,
        &body.password,
        state.config.jwt_secret.as_bytes(),
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /verify` — resolve the bearer token to its user.
pub async fn verify_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> AppResult<Json<UserResponse>> {
    let user = auth::current_user(state.store.as_ref(), user.user_id()).await?;
    Ok(Json(UserResponse { user }))
}

/// `POST /forgot-password` — mail a reset link if the email is registered.
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = auth::forgot_password(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.config.app_url,
        &body.email,
    )
    .await?;
    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

/// `POST /reset-password` — set a new password with a mailed token.
pub async fn reset_password_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<SuccessResponse>> {
    auth::reset_password(state.store.as_ref(), &body.token, &body.password).await?;
    Ok(Json(SuccessResponse::ok()))
}
