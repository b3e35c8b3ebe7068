//! App state: the cached page and server config.

use std::time::Duration;

use webcache_core::{CacheConfig, CachedPage};

const DEFAULT_MAX_AGE_SECS: u64 = 10;
const DEFAULT_BACKEND_DELAY_MS: u64 = 5_000;
const DEFAULT_STATS_INTERVAL_SECS: u64 = 60;

/// Demo server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// How long a generated page stays valid
    pub max_age: Duration,
    /// Simulated latency of the backend function
    pub backend_delay: Duration,
    /// Statistics reporting period; zero disables the reporter
    pub stats_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
            backend_delay: Duration::from_millis(DEFAULT_BACKEND_DELAY_MS),
            stats_interval: Duration::from_secs(DEFAULT_STATS_INTERVAL_SECS),
        }
    }
}

impl ServerConfig {
    /// Reads `WEBCACHE_*` variables, loading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            max_age: Duration::from_secs(env_u64("WEBCACHE_MAX_AGE_SECS", DEFAULT_MAX_AGE_SECS)),
            backend_delay: Duration::from_millis(env_u64(
                "WEBCACHE_BACKEND_DELAY_MS",
                DEFAULT_BACKEND_DELAY_MS,
            )),
            stats_interval: Duration::from_secs(env_u64(
                "WEBCACHE_STATS_INTERVAL_SECS",
                DEFAULT_STATS_INTERVAL_SECS,
            )),
        }
    }

    /// Cache settings derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::with_max_age(self.max_age)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Shared state handed to every handler.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// The one cached page
    pub page: CachedPage,
}

impl AppState {
    /// Creates the state with an empty, expired page.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            page: CachedPage::new(config.max_age),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_u64_parsing() {
        std::env::set_var("WEBCACHE_TEST_ENV_U64", " 42 ");
        assert_eq!(env_u64("WEBCACHE_TEST_ENV_U64", 1), 42);

        std::env::set_var("WEBCACHE_TEST_ENV_U64", "soon");
        assert_eq!(env_u64("WEBCACHE_TEST_ENV_U64", 1), 1);

        assert_eq!(env_u64("WEBCACHE_TEST_ENV_U64_MISSING", 7), 7);
    }

    #[test]
    fn test_defaults_match_example_server() {
        let config = ServerConfig::default();
        assert_eq!(config.max_age, Duration::from_secs(10));
        assert_eq!(config.backend_delay, Duration::from_secs(5));
        assert!(config.cache_config().validate().is_ok());
    }

    #[test]
    fn test_new_state_starts_expired() {
        let state = AppState::new(ServerConfig::default());
        assert!(!state.page.is_valid());
        assert_eq!(state.page.max_age(), Duration::from_secs(10));
    }
}
