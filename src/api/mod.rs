//! API module - HTTP handlers and routes

pub mod handlers;

use std::path::Path;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::{ServeDir, ServeFile};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Device proxy
        .route("/api/status", get(handlers::get_status))
        .route("/api/control/:relay_id", post(handlers::control_relay))
}

/// Web UI: `/` is the index page, `/static/*` the rest of the directory.
pub fn static_files(static_dir: &Path) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
}

pub fn app(state: AppState, static_dir: &Path) -> Router {
    routes().merge(static_files(static_dir)).with_state(state)
}
