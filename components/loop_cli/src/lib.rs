//! Event loop demo CLI library
//!
//! Provides argument parsing, the built-in demos and the runner behind the
//! `vloop` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod demos;
pub mod error;
pub mod runner;

pub use cli::{Cli, Command, RunArgs};
pub use demos::Demo;
pub use error::{CliError, CliResult};
pub use runner::{execute, load_config, run_demo, DemoRun};
