//! Route handlers.

use std::sync::Arc;

use askama::Template;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{debug, info};
use webcache_core::http_date::fmt_http_date;

use crate::backend::complex_backend_function;
use crate::dto::{HealthResponse, StatsResponse};
use crate::error::ApiError;
use crate::render::PageTemplate;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /
///
/// Serves the cached page, regenerating it first when it has expired and
/// no other request is already doing so.
pub async fn cached_page(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse> {
    if !state.page.is_valid() {
        match state.page.try_update() {
            Ok(mut update) => {
                let result = complex_backend_function(state.config.backend_delay).await;
                PageTemplate { content: &result }
                    .render_into(&mut update)
                    .map_err(|_| ApiError::internal("Failed to render page"))?;
                update.commit()?;
                info!("Page regenerated");
            }
            Err(_) => debug!("Update already running, serving cached page"),
        }
    }

    let (body, published) = state.page.read_with_timestamp();

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::LAST_MODIFIED, fmt_http_date(published)),
        ],
        body,
    ))
}

/// GET /clear/
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.page.invalidate();
    info!("Cache cleared");
    (StatusCode::FOUND, [(header::LOCATION, "/")])
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

/// GET /api/v1/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let stats = state.page.statistics();

    Json(StatsResponse {
        requests: stats.requests,
        updates: stats.updates,
        status: state.page.status(),
        last_modified: state.page.last_modified(),
        max_age_seconds: state.page.max_age().as_secs(),
    })
}
