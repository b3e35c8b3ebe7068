//! Cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default lifetime of published content.
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 10;

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long published content stays valid, in seconds
    pub max_age_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the given max age.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            max_age_seconds: max_age.as_secs(),
        }
    }

    /// Returns the max age as a `Duration`.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }

    /// Rejects a zero max age, which would make every read a miss.
    pub fn validate(&self) -> Result<()> {
        if self.max_age_seconds == 0 {
            return Err(CacheError::Config("max_age_seconds must be greater than 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CacheConfig::default();
        assert_eq!(config.max_age(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_age_rejected() {
        let config = CacheConfig::with_max_age(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_deserialize() {
        let config: CacheConfig = serde_json::from_str(r#"{"max_age_seconds":30}"#).unwrap();
        assert_eq!(config.max_age(), Duration::from_secs(30));
    }
}
