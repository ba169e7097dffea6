//! # cuisine_api
//!
//! HTTP API library for Cuisine Quest.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use cuisine_core::mail::Mailer;
use cuisine_core::meals::MealClient;
use cuisine_core::store::UserStore;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, favorites, health, meals, profile};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Users and favorites.
    pub store: Arc<dyn UserStore>,
    /// Password-reset mail delivery.
    pub mailer: Arc<dyn Mailer>,
    /// TheMealDB passthrough.
    pub meals: MealClient,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `cuisine_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    cuisine_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_SIGNUP, post(auth::signup_handler))
        .route(routes::POST_LOGIN, post(auth::login_handler))
        .route(
            routes::POST_FORGOT_PASSWORD,
            post(auth::forgot_password_handler),
        )
        .route(
            routes::POST_RESET_PASSWORD,
            post(auth::reset_password_handler),
        )
        .route(routes::GET_MEALS_SEARCH, get(meals::search_handler))
        .route(routes::GET_MEALS_LETTER, get(meals::by_letter_handler))
        .route(routes::GET_MEALS_RANDOM, get(meals::random_handler))
        .route(routes::GET_MEALS_ID, get(meals::by_id_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_VERIFY, get(auth::verify_handler))
        .route(routes::PUT_PROFILE, put(profile::update_profile_handler))
        .route(
            routes::FAVORITES,
            get(favorites::list_favorites_handler)
                .post(favorites::add_favorite_handler)
                .delete(favorites::remove_favorite_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
