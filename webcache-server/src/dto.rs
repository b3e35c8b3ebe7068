//! Response bodies for the JSON endpoints.

use serde::{Deserialize, Serialize};
use webcache_core::PageStatus;

/// GET /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`
    pub status: String,
}

/// GET /api/v1/stats
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Reads since the last reporter reset
    pub requests: u64,
    /// Completed updates since the last reporter reset
    pub updates: u64,
    /// Current cache state
    pub status: PageStatus,
    /// HTTP-date of the last publish
    pub last_modified: String,
    /// Configured max age
    pub max_age_seconds: u64,
}
