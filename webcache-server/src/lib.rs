//! # webcache demo server
//!
//! A web server with a deliberately slow backend, showing how a
//! [`CachedPage`](webcache_core::CachedPage) keeps response times low and
//! lets only one request at a time pay for regeneration.
//!
//! ## Endpoints
//!
//! - `GET /` - The cached page, with a `Last-Modified` header
//! - `GET /clear/` - Invalidate the cache and redirect to `/`
//! - `GET /health` - Health check
//! - `GET /api/v1/stats` - Current counters and cache state
//!
//! ## Example
//!
//! ```rust,ignore
//! use webcache_server::{ApiServer, ServerConfig};
//!
//! let server = ApiServer::new(ServerConfig::from_env());
//! server.run(([0, 0, 0, 0], 8080)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod backend;
mod dto;
mod error;
mod handlers;
mod render;
mod reporter;
mod routes;
mod state;

pub use dto::{HealthResponse, StatsResponse};
pub use error::ApiError;
pub use render::PageTemplate;
pub use reporter::{report, spawn_stats_reporter};
pub use routes::create_router;
pub use state::{AppState, ServerConfig};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Demo server wrapping a single cached page.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server and the statistics reporter on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        let reporter = spawn_stats_reporter(self.state.clone(), self.state.config.stats_interval);

        info!(
            max_age_secs = self.state.config.max_age.as_secs(),
            "webcache demo server listening on {}", addr
        );

        let result = axum::serve(listener, self.router()).await;
        if let Some(handle) = reporter {
            handle.abort();
        }
        result
    }
}
