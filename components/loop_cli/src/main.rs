//! `vloop` entry point.
//!
//! Parses CLI arguments, sets up logging and delegates to the runner.

use clap::Parser as ClapParser;
use loop_cli::{execute, Cli};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("VLOOP_LOG", "warn"))
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let stderr = io::stderr();
    match execute(&cli, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
