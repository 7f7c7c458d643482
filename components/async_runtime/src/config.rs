//! Event loop configuration.
//!
//! [`LoopConfig`] has sensible defaults and can be built in code or loaded
//! from JSON; missing fields keep their default values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for [`LoopConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value the loop cannot run with
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Tunables of an [`EventLoop`](crate::EventLoop).
///
/// # Examples
///
/// ```
/// use async_runtime::LoopConfig;
///
/// let config = LoopConfig::from_json_str(r#"{ "max_stack_depth": 64 }"#).unwrap();
/// assert_eq!(config.max_stack_depth, 64);
/// assert!(config.report_unhandled_rejections);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Maximum simulated call depth before a stack overflow
    pub max_stack_depth: usize,
    /// Stop the drive call immediately when a task overflows its stack
    pub abort_on_stack_overflow: bool,
    /// Report rejections nobody handled before the promise became unreachable
    /// or the loop went quiescent
    pub report_unhandled_rejections: bool,
    /// Upper bound on timer turns per drive call
    pub max_turns: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: 256,
            abort_on_stack_overflow: true,
            report_unhandled_rejections: true,
            max_turns: None,
        }
    }
}

impl LoopConfig {
    /// Sets the maximum call depth.
    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    /// Sets whether a stack overflow aborts the drive call.
    pub fn with_abort_on_stack_overflow(mut self, abort: bool) -> Self {
        self.abort_on_stack_overflow = abort;
        self
    }

    /// Sets whether unhandled rejections are reported.
    pub fn with_report_unhandled_rejections(mut self, report: bool) -> Self {
        self.report_unhandled_rejections = report;
        self
    }

    /// Bounds the number of timer turns per drive call.
    pub fn with_max_turns(mut self, turns: u64) -> Self {
        self.max_turns = Some(turns);
        self
    }

    /// Checks that the loop can run with these values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_stack_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_stack_depth must be at least 1".to_string(),
            ));
        }
        if self.max_turns == Some(0) {
            return Err(ConfigError::Invalid(
                "max_turns must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: LoopConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
