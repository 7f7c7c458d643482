//! Errors reported by the event loop and the report returned by a run.
//!
//! Task failures never escape a task: they become [`ReportedError`]s that are
//! collected in the [`RunReport`] of the drive call. Only conditions that stop
//! the driver itself are returned as [`LoopError`].

use crate::task_queue::TaskKind;
use core_types::JsError;
use serde::Serialize;
use thiserror::Error;

/// A non-fatal failure observed while running tasks.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ReportedError {
    /// A task, timer callback or microtask returned an error
    #[error("Uncaught {error} (in {task})")]
    TaskError {
        /// Where the failing task came from
        task: TaskKind,
        /// Sequence number of the failing task
        seq: u64,
        /// The uncaught error
        error: JsError,
    },
    /// A promise was rejected and no handler was attached before it became
    /// unreachable or the loop went quiescent
    #[error("Unhandled promise rejection: {reason} (promise #{promise})")]
    UnhandledRejection {
        /// Id of the rejected promise
        promise: u64,
        /// The rejection reason
        reason: JsError,
    },
    /// A task exceeded the call depth bound; the task was abandoned
    #[error("Maximum call stack size exceeded at depth {depth} (in {task})")]
    StackOverflow {
        /// Where the overflowing task came from
        task: TaskKind,
        /// Sequence number of the overflowing task
        seq: u64,
        /// Depth of the call that overflowed
        depth: usize,
    },
}

impl ReportedError {
    /// Returns true for [`ReportedError::UnhandledRejection`].
    pub fn is_unhandled_rejection(&self) -> bool {
        matches!(self, ReportedError::UnhandledRejection { .. })
    }

    /// Returns true for [`ReportedError::TaskError`].
    pub fn is_task_error(&self) -> bool {
        matches!(self, ReportedError::TaskError { .. })
    }

    /// Returns true for [`ReportedError::StackOverflow`].
    pub fn is_stack_overflow(&self) -> bool {
        matches!(self, ReportedError::StackOverflow { .. })
    }
}

/// A condition that stops a drive call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoopError {
    /// A task overflowed its stack and the loop is configured to abort
    #[error("Maximum call stack size exceeded at depth {depth} (in {task})")]
    StackOverflow {
        /// Where the overflowing task came from
        task: TaskKind,
        /// Sequence number of the overflowing task
        seq: u64,
        /// Depth of the call that overflowed
        depth: usize,
        /// What the drive call had done and reported before it stopped
        report: RunReport,
    },
    /// The loop was driven from inside one of its own tasks
    #[error("event loop is already running")]
    Reentrant,
    /// The drive call used up its timer turn budget with work still queued
    #[error("turn limit of {turns} exceeded with timers still pending")]
    TurnLimitExceeded {
        /// Number of turns taken
        turns: u64,
        /// What the drive call had done and reported before it stopped
        report: RunReport,
    },
    /// The loop was shut down
    #[error("event loop has been shut down")]
    Shutdown,
}

impl LoopError {
    /// The partial report of a drive call that stopped early, if any.
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            LoopError::StackOverflow { report, .. } | LoopError::TurnLimitExceeded { report, .. } => {
                Some(report)
            }
            LoopError::Reentrant | LoopError::Shutdown => None,
        }
    }
}

/// Outcome of one drive call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Errors in the order they were reported
    pub errors: Vec<ReportedError>,
    /// Tasks executed, of every kind
    pub tasks_run: u64,
    /// Microtasks executed
    pub microtasks_run: u64,
    /// Timer callbacks executed
    pub timers_fired: u64,
    /// Virtual time when the call returned, in milliseconds
    pub virtual_time: u64,
}

impl RunReport {
    /// Returns true if nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first reported error.
    pub fn first_error(&self) -> Option<&ReportedError> {
        self.errors.first()
    }

    /// Number of unhandled rejections reported.
    pub fn unhandled_rejections(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.is_unhandled_rejection())
            .count()
    }

    /// Converts the report into an error carrying its first reported error.
    pub fn into_result(self) -> Result<RunReport, ReportedError> {
        match self.errors.first() {
            Some(error) => Err(error.clone()),
            None => Ok(self),
        }
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "{} tasks ({} microtasks, {} timers), {} errors, virtual time {}ms",
            self.tasks_run,
            self.microtasks_run,
            self.timers_fired,
            self.errors.len(),
            self.virtual_time
        )
    }
}
