//! Periodic statistics reporter.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::info;
use webcache_core::{CachedPage, Clock, Statistics};

use crate::state::AppState;

/// Resets the page counters and logs the values they had.
pub fn report<C: Clock>(page: &CachedPage<C>) -> Statistics {
    let stats = page.reset_statistics();
    info!(requests = stats.requests, updates = stats.updates, "Cache statistics");
    stats
}

/// Spawns a task reporting statistics every `every`.
///
/// Returns `None` without spawning when `every` is zero.
pub fn spawn_stats_reporter(state: Arc<AppState>, every: Duration) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            report(&state.page);
        }
    }))
}
