//! Error types for the page cache.
//!
//! Two of the variants describe the update transaction protocol; the third
//! covers configuration that cannot produce a usable cache.

use thiserror::Error;

/// Result type alias using `CacheError`.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Main error type for all cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Another caller already holds the update transaction.
    ///
    /// Expected under concurrency: skip regeneration and serve the
    /// existing content.
    #[error("another update is already running")]
    AlreadyUpdating,

    /// Staging write, completion or abort attempted with no open transaction.
    #[error("no update in progress: call begin_update() first")]
    NotUpdating,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns true if the caller can simply retry on a later request.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CacheError::AlreadyUpdating)
    }

    /// Returns true if the error points at a misuse of the update protocol.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, CacheError::NotUpdating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            CacheError::AlreadyUpdating.to_string(),
            "another update is already running"
        );
        assert!(CacheError::NotUpdating.to_string().contains("begin_update"));
        assert!(CacheError::Config("max_age".into()).to_string().contains("max_age"));
    }

    #[test]
    fn test_error_classification() {
        assert!(CacheError::AlreadyUpdating.is_recoverable());
        assert!(!CacheError::NotUpdating.is_recoverable());
        assert!(CacheError::NotUpdating.is_contract_violation());
        assert!(!CacheError::Config("x".into()).is_contract_violation());
    }
}
