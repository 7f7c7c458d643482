//! Command-line arguments

use crate::demos::Demo;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Deterministic event loop demos on a virtual clock
#[derive(Debug, Parser)]
#[command(name = "vloop", version, about)]
pub struct Cli {
    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the built-in demos
    List,
    /// Run one demo and print its console output
    Run(RunArgs),
}

/// Arguments of `vloop run`
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Demo to run
    #[arg(value_enum)]
    pub demo: Demo,

    /// JSON file with the event loop configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the output and the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Make the demo's asynchronous operation fail
    #[arg(long)]
    pub fail: bool,

    /// Override the maximum call stack depth
    #[arg(long)]
    pub max_stack_depth: Option<usize>,
}
