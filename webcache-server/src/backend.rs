//! Simulated slow backend.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

/// Produces the page message after `delay`, standing in for an expensive
/// upstream call.
pub async fn complex_backend_function(delay: Duration) -> String {
    debug!(delay_ms = delay.as_millis() as u64, "Running backend function");
    tokio::time::sleep(delay).await;
    format!("Last update at {}", Utc::now().format("%H:%M:%S"))
}
