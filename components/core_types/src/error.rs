//! Thrown error values.
//!
//! A [`JsError`] is what a task "throws": it is the rejection reason of a
//! promise, the payload of an uncaught task error, and what `?` carries out
//! of an awaited rejection.

use crate::StackFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of error, named after the JavaScript constructor it mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Plain `Error`, also used for rejections with a bare reason
    Error,
    /// Type error (e.g. a promise resolved with itself)
    TypeError,
    /// Value out of range, including call stack exhaustion
    RangeError,
    /// Reference to an undefined binding
    ReferenceError,
    /// Syntax error
    SyntaxError,
    /// Internal scheduler error
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Error => "Error",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::InternalError => "InternalError",
        };
        f.write_str(name)
    }
}

/// An error with message and stack trace.
///
/// # Examples
///
/// ```
/// use core_types::{ErrorKind, JsError};
///
/// let error = JsError::new(ErrorKind::TypeError, "undefined is not a function");
///
/// assert_eq!(error.message, "undefined is not a function");
/// assert!(error.stack.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct JsError {
    /// The type of error
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
    /// Stack trace (innermost frame last), empty until captured
    pub stack: Vec<StackFrame>,
}

impl JsError {
    /// Creates an error without a stack trace.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stack: Vec::new(),
        }
    }

    /// Shorthand for a plain `Error`, the usual rejection reason.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Shorthand for a `TypeError`.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    /// Shorthand for a `RangeError`.
    pub fn range_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeError, message)
    }

    /// Attaches a stack trace, replacing any existing one.
    pub fn with_stack(mut self, stack: Vec<StackFrame>) -> Self {
        self.stack = stack;
        self
    }

    /// Renders the error followed by one `    at <frame>` line per frame,
    /// innermost first.
    pub fn stack_trace(&self) -> String {
        let mut out = self.to_string();
        for frame in self.stack.iter().rev() {
            out.push_str("\n    at ");
            out.push_str(&frame.to_string());
        }
        out
    }
}
