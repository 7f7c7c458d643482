//! Core value and error types shared by the virtual event loop.
//!
//! This crate provides the payloads that flow through the scheduler:
//! the values promises settle with, the errors tasks throw, and the
//! call-stack frames attached to those errors.
//!
//! # Overview
//!
//! - [`Value`] - Settlement payload of a promise or result of a task
//! - [`JsError`] - A thrown error with its stack trace
//! - [`ErrorKind`] - The constructor an error was created with
//! - [`StackFrame`] - One frame of the simulated call stack
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Value};
//!
//! let value = Value::from("Operation completed successfully!");
//! assert!(value.is_truthy());
//! assert_eq!(value.type_of(), "string");
//!
//! let error = JsError::new(ErrorKind::Error, "Operation failed.");
//! assert_eq!(error.to_string(), "Error: Operation failed.");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod frame;
mod value;

pub use error::{ErrorKind, JsError};
pub use frame::StackFrame;
pub use value::Value;
