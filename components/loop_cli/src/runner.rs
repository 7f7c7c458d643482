//! Runs demos and renders their output.

use crate::cli::{Cli, Command, RunArgs};
use crate::demos::Demo;
use crate::error::CliResult;
use async_runtime::{
    ConsoleLevel, ConsoleLine, ConsoleWriter, EventLoop, LoopConfig, LoopError, RunReport,
};
use serde::Serialize;
use std::io::Write;

/// Output of one demo run.
#[derive(Debug)]
pub struct DemoRun {
    /// The demo that ran
    pub demo: Demo,
    /// Console lines in emission order, up to the point the loop stopped
    pub lines: Vec<ConsoleLine>,
    /// The run report, or the error that stopped the loop
    pub result: Result<RunReport, LoopError>,
    /// Timers still queued when the loop was torn down
    pub pending_timers: usize,
}

impl DemoRun {
    /// Returns true if the loop reached quiescence without reporting errors.
    pub fn is_clean(&self) -> bool {
        matches!(&self.result, Ok(report) if report.is_clean())
    }

    /// The text of every console line.
    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.text.clone()).collect()
    }

    /// The run report, failing if the loop stopped early.
    pub fn into_report(self) -> CliResult<RunReport> {
        Ok(self.result?)
    }

    /// The report of the run, complete or cut short.
    pub fn report(&self) -> Option<&RunReport> {
        match &self.result {
            Ok(report) => Some(report),
            Err(error) => error.report(),
        }
    }
}

/// Mirrors console lines into the log as they are emitted, so that
/// `VLOOP_LOG=debug` interleaves them with the scheduler's own records.
struct LogWriter;

impl ConsoleWriter for LogWriter {
    fn write(&self, line: &ConsoleLine) {
        log::debug!(target: "vloop::console", "{:?}: {}", line.level, line.text);
    }
}

#[derive(Serialize)]
struct JsonRun<'a> {
    demo: &'a str,
    output: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    pending_timers: usize,
}

/// Builds the loop configuration from `--config` and the overrides.
pub fn load_config(args: &RunArgs) -> CliResult<LoopConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            LoopConfig::from_json_file(path)?
        }
        None => LoopConfig::default(),
    };
    if let Some(depth) = args.max_stack_depth {
        config = config.with_max_stack_depth(depth);
        config.validate()?;
    }
    Ok(config)
}

/// Runs `demo` on a fresh event loop.
pub fn run_demo(demo: Demo, config: LoopConfig, fail: bool) -> CliResult<DemoRun> {
    log::info!("running demo {} (fail: {})", demo.name(), fail);
    let el = EventLoop::with_writer(config, LogWriter)?;
    let result = demo.run(&el, fail);
    let lines = el.console().lines();
    let pending_timers = el.pending_timers();
    if pending_timers > 0 {
        log::info!("discarding {} pending timers", pending_timers);
    }
    el.shutdown();
    Ok(DemoRun {
        demo,
        lines,
        result,
        pending_timers,
    })
}

/// Executes the parsed command line.
///
/// Returns whether the command succeeded: a demo run that reported errors
/// or stopped early counts as a failure.
pub fn execute(cli: &Cli, out: &mut dyn Write, err: &mut dyn Write) -> CliResult<bool> {
    match &cli.command {
        Command::List => {
            for demo in Demo::ALL {
                writeln!(out, "{:<16}{}", demo.name(), demo.description())?;
            }
            Ok(true)
        }
        Command::Run(args) => {
            let config = load_config(args)?;
            let run = run_demo(args.demo, config, args.fail)?;
            if args.json {
                write_json(&run, out)?;
            } else {
                write_text(&run, out, err)?;
            }
            Ok(run.is_clean())
        }
    }
}

fn write_text(run: &DemoRun, out: &mut dyn Write, err: &mut dyn Write) -> CliResult<()> {
    for line in &run.lines {
        match line.level {
            ConsoleLevel::Log | ConsoleLevel::Info => writeln!(out, "{}", line)?,
            ConsoleLevel::Warn | ConsoleLevel::Error => writeln!(err, "{}", line)?,
        }
    }
    if let Some(report) = run.report() {
        for error in &report.errors {
            writeln!(err, "{}", error)?;
        }
    }
    if let Err(error) = &run.result {
        writeln!(err, "event loop stopped: {}", error)?;
    }
    if let Some(report) = run.report() {
        writeln!(err, "-- {}", report.summary())?;
    }
    if run.pending_timers > 0 {
        writeln!(err, "-- {} timers discarded", run.pending_timers)?;
    }
    Ok(())
}

fn write_json(run: &DemoRun, out: &mut dyn Write) -> CliResult<()> {
    let json = JsonRun {
        demo: run.demo.name(),
        output: run.texts(),
        report: run.report(),
        error: run.result.as_ref().err().map(|e| e.to_string()),
        pending_timers: run.pending_timers,
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}
