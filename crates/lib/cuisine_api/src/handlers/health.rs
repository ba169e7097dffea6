//! Health check endpoint.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /health` — core version and store reachability.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        version: cuisine_core::version().to_string(),
        store_connected: state.store.ping().await,
    })
}
