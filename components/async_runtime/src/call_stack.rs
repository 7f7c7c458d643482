//! The execution stack.
//!
//! Only run-to-completion semantics matter to the scheduler, so the stack
//! tracks frame names and depth rather than real activation records. The
//! depth bound exists to turn runaway recursion into a `RangeError`.

use core_types::{JsError, StackFrame};

/// Message of the error raised when the depth bound is hit.
pub const STACK_OVERFLOW_MESSAGE: &str = "Maximum call stack size exceeded";

/// Simulated call stack for the task currently executing.
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<String>,
    max_depth: usize,
    overflow: Option<usize>,
}

impl CallStack {
    /// Creates an empty stack that allows at most `max_depth` frames.
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth: max_depth.max(1),
            overflow: None,
        }
    }

    /// Starts a task: clears leftovers and pushes the task's outermost frame.
    pub fn enter_task(&mut self, name: &str) {
        self.frames.clear();
        self.overflow = None;
        self.frames.push(name.to_string());
    }

    /// Ends a task, returning the depth at which it overflowed, if it did.
    pub fn leave_task(&mut self) -> Option<usize> {
        self.frames.clear();
        self.overflow.take()
    }

    /// Pushes a frame for a nested synchronous call.
    ///
    /// Fails with a `RangeError` when the stack is already at its bound.
    /// The first overflow of a task is remembered until [`leave_task`],
    /// so swallowing the error does not hide it.
    ///
    /// [`leave_task`]: CallStack::leave_task
    pub fn push(&mut self, name: &str) -> Result<usize, JsError> {
        if self.frames.len() >= self.max_depth {
            let depth = self.frames.len() + 1;
            self.overflow.get_or_insert(depth);
            return Err(JsError::range_error(STACK_OVERFLOW_MESSAGE).with_stack(self.frames()));
        }
        self.frames.push(name.to_string());
        Ok(self.frames.len())
    }

    /// Pops the innermost frame.
    pub fn pop(&mut self) -> Option<String> {
        self.frames.pop()
    }

    /// Current number of frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Snapshot of the frames, outermost first.
    pub fn frames(&self) -> Vec<StackFrame> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, name)| StackFrame::new(name.clone(), i + 1))
            .collect()
    }
}
