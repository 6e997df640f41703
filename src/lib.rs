//! Preston Game Backend
//!
//! Session scoring service for the Preston AI-readiness game, with SQLite
//! persistence and leaderboard ranking, plus the typed client-side session
//! accumulator used between game screens.

pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod scoring;
pub mod session;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let game_routes = Router::new()
        .route("/session", post(api::create_session))
        .route("/session/{id}", get(api::get_session))
        .route("/session/{id}/task", put(api::update_task_score))
        .route("/session/{id}/rank", get(api::get_session_rank))
        .route("/leaderboard", get(api::get_leaderboard));

    // Health check outside the API prefix
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api/game", game_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
