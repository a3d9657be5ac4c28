//! Node error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request exceeds {limit} bytes")]
    RequestTooLarge { limit: usize },

    #[error("Peer closed the connection without a response")]
    EmptyResponse,
}

/// Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;
