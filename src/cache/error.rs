//! Cache error types

use redis::RedisError;
use std::time::Duration;

/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  /// Error reported by Redis or the connection manager, passed through as is.
  #[error(transparent)]
  Redis(#[from] RedisError),

  /// The initial connect or liveness ping failed.
  #[error("could not reach redis at {addr}: {source}")]
  Unreachable {
    addr: String,
    #[source]
    source: RedisError,
  },

  /// The cache was closed with [`Cache::close`](super::Cache::close).
  #[error("cache connection is closed")]
  Closed,

  #[error("operation timed out after {0:?}")]
  Timeout(Duration),

  #[error("config error: {0}")]
  Config(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("yaml error: {0}")]
  Yaml(#[from] serde_yaml::Error),
}

impl CacheError {
  /// True for errors caused by the connection going away (closed facade,
  /// dropped socket, refused connect).
  pub fn is_connection_error(&self) -> bool {
    match self {
      CacheError::Closed | CacheError::Unreachable { .. } => true,
      CacheError::Redis(e) => {
        e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal()
      }
      _ => false,
    }
  }
}
