use std::time::Duration;

use thiserror::Error;

/// Cache failures. None of these ever reach an end user; callers log them and
/// fall back to storage.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("cached payload is corrupt")]
    Corrupt(#[source] serde_json::Error),

    #[error("failed to encode cache payload")]
    Encode(#[source] serde_json::Error),

    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Unavailable(err.to_string())
    }
}
