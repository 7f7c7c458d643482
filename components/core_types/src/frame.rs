//! Call stack frames for error stack traces.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single frame of the simulated call stack.
///
/// # Examples
///
/// ```
/// use core_types::StackFrame;
///
/// let frame = StackFrame::new("firstFunction", 2);
///
/// assert_eq!(frame.function_name.as_deref(), Some("firstFunction"));
/// assert_eq!(frame.depth, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Name of the function, or None for anonymous functions
    pub function_name: Option<String>,
    /// Depth of the frame, 1 for the outermost frame of a task
    pub depth: usize,
}

impl StackFrame {
    /// Creates a named frame.
    pub fn new(function_name: impl Into<String>, depth: usize) -> Self {
        Self {
            function_name: Some(function_name.into()),
            depth,
        }
    }

    /// Creates an anonymous frame.
    pub fn anonymous(depth: usize) -> Self {
        Self {
            function_name: None,
            depth,
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.function_name {
            Some(name) => f.write_str(name),
            None => f.write_str("<anonymous>"),
        }
    }
}
