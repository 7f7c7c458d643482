//! Deterministic event loop on a virtual clock.
//!
//! This crate models the concurrency model of a JavaScript host on a single
//! thread:
//! - An execution stack with a bounded depth
//! - A microtask queue for promise reactions and `queueMicrotask` callbacks
//! - A timer queue ordered by due time, then by scheduling order
//! - Promises with chaining, adoption and unhandled-rejection tracking
//! - `async`/`await` through Rust futures awaiting promises
//!
//! Time is virtual: the clock only moves when the loop jumps to the next due
//! timer or when [`EventLoop::advance_virtual_clock`] is called, so a run is
//! reproducible down to the order of every console line.
//!
//! # Overview
//!
//! - [`EventLoop`] - Scheduler coordinating the stack and both queues
//! - [`Promise`] - Promise/A+ style settlement with microtask reactions
//! - [`LoopConfig`] - Stack bound, error policy and turn budget
//! - [`RunReport`] - Errors and counters collected by one drive call
//!
//! # Examples
//!
//! ```
//! use async_runtime::EventLoop;
//! use core_types::{JsError, Value};
//!
//! let el = EventLoop::new();
//! let report = el
//!     .run(|el| {
//!         el.new_promise(|el, resolver| {
//!             el.set_timeout(move |_| {
//!                 resolver.reject(JsError::error("Operation failed."));
//!                 Ok(Value::Undefined)
//!             }, 1000);
//!             Ok(())
//!         })
//!         .catch(|el, error| {
//!             el.console().error(format!("Error: {}", error.message));
//!             Ok(())
//!         });
//!         Ok(Value::Undefined)
//!     })
//!     .unwrap();
//!
//! assert!(report.is_clean());
//! assert_eq!(el.now(), 1000);
//! assert_eq!(el.console().texts(), vec!["Error: Operation failed."]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod async_task;
pub mod call_stack;
pub mod config;
pub mod console;
pub mod error;
pub mod event_loop;
pub mod promise;
pub mod task_queue;
pub mod timer_queue;

// Re-export main types at crate root
pub use async_task::PromiseFuture;
pub use call_stack::{CallStack, STACK_OVERFLOW_MESSAGE};
pub use config::{ConfigError, LoopConfig};
pub use console::{CaptureWriter, Console, ConsoleLevel, ConsoleLine, ConsoleWriter};
pub use error::{LoopError, ReportedError, RunReport};
pub use event_loop::EventLoop;
pub use promise::{OnFulfilled, OnRejected, Promise, PromiseReaction, PromiseState, Resolution, Resolver};
pub use task_queue::{Callback, MicrotaskQueue, Task, TaskKind};
pub use timer_queue::{FiredTimer, TimerHandle, TimerQueue};
