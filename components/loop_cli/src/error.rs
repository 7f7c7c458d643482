//! Error types for the CLI

use async_runtime::{ConfigError, LoopError};
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Writing output failed
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// The loop configuration could not be loaded
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The event loop stopped before reaching quiescence
    #[error("event loop failed: {0}")]
    Loop(#[from] LoopError),

    /// The report could not be encoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
