//! Route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Cached page
        .route("/", get(handlers::cached_page))
        .route("/clear/", get(handlers::clear_cache))

        // Operations
        .route("/health", get(handlers::health_check))
        .route("/api/v1/stats", get(handlers::get_stats))

        .with_state(state)
}
