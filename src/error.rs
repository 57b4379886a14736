//! Unified error types for the helper

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for helper operations
#[derive(Error, Debug)]
pub enum HelperError {
    /// Configuration file could not be read or written
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listener could not bind its port
    #[error("Failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// Listener thread or runtime failure
    #[error("HTTP server error: {0}")]
    Server(String),

    /// Instance lock file could not be written or removed
    #[error("Instance lock error at {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Registry write failed
    #[error("Registry error: {0}")]
    Registry(String),

    /// Thread communication error
    #[error("Thread communication error: {0}")]
    ChannelError(String),
}

/// Result type alias for helper operations
pub type Result<T> = std::result::Result<T, HelperError>;

impl HelperError {
    /// Create a lock error with the offending path
    pub fn lock(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Lock {
            path: path.display().to_string(),
            source,
        }
    }

    /// Check if this error means the listener port is unavailable
    pub fn is_port_conflict(&self) -> bool {
        matches!(self, HelperError::Bind { .. })
    }
}
