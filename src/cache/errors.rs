//! Cache errors

use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache adapter errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// No entry under the key, or it expired
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    /// Backend failure (I/O, lock poisoning, policy limits)
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Payload could not be encoded or decoded
    #[error("Cache serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err.to_string())
    }
}
