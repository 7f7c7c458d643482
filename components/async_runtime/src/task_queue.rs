//! Tasks and the microtask queue.
//!
//! Every unit of work the event loop runs is a [`Task`]: an owned closure plus
//! the sequence number it was created with. Microtasks (promise reactions,
//! `queueMicrotask` callbacks, async resumptions) wait in the
//! [`MicrotaskQueue`] and are drained completely before any timer fires.

use crate::timer_queue::TimerHandle;
use crate::EventLoop;
use core_types::{JsError, Value};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// The boxed body of a task.
pub type Callback = Box<dyn FnOnce(&EventLoop) -> Result<Value, JsError>>;

/// Where a task came from; also the name of its outermost stack frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskKind {
    /// The entry task passed to [`EventLoop::run`]
    Entry,
    /// A callback queued with [`EventLoop::queue_microtask`]
    Microtask,
    /// A promise reaction
    Reaction,
    /// Resumption of a suspended async task
    AsyncResume,
    /// A timer or interval callback
    Timer(TimerHandle),
}

impl TaskKind {
    /// Returns true for kinds that run from the microtask queue.
    pub fn is_microtask(&self) -> bool {
        matches!(
            self,
            TaskKind::Microtask | TaskKind::Reaction | TaskKind::AsyncResume
        )
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Entry => f.write_str("<entry>"),
            TaskKind::Microtask => f.write_str("<microtask>"),
            TaskKind::Reaction => f.write_str("<reaction>"),
            TaskKind::AsyncResume => f.write_str("<async>"),
            TaskKind::Timer(handle) => write!(f, "<timer #{}>", handle.id()),
        }
    }
}

/// A unit of work to be executed by the event loop.
///
/// Tasks run to completion: once started, a task is never interrupted.
pub struct Task {
    seq: u64,
    kind: TaskKind,
    callback: Callback,
}

impl Task {
    /// Creates a new Task from a closure.
    ///
    /// # Arguments
    ///
    /// * `seq` - Insertion sequence number, used to order equal-priority work
    /// * `kind` - Where the task came from
    /// * `f` - The function to execute when the task runs
    pub fn new<F>(seq: u64, kind: TaskKind, f: F) -> Self
    where
        F: FnOnce(&EventLoop) -> Result<Value, JsError> + 'static,
    {
        Self {
            seq,
            kind,
            callback: Box::new(f),
        }
    }

    /// Creates a Task from an already boxed callback.
    pub fn from_callback(seq: u64, kind: TaskKind, callback: Callback) -> Self {
        Self {
            seq,
            kind,
            callback,
        }
    }

    /// The sequence number this task was created with.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Where this task came from.
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Executes the task.
    pub fn run(self, event_loop: &EventLoop) -> Result<Value, JsError> {
        (self.callback)(event_loop)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task {{ seq: {}, kind: {} }}", self.seq, self.kind)
    }
}

/// A FIFO queue for microtasks.
///
/// Microtasks are drained completely after each task, including microtasks
/// enqueued while draining.
#[derive(Debug, Default)]
pub struct MicrotaskQueue {
    queue: VecDeque<Task>,
}

impl MicrotaskQueue {
    /// Creates a new empty MicrotaskQueue.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// Adds a microtask to the end of the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    /// Removes and returns the next microtask from the queue.
    pub fn dequeue(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of microtasks in the queue.
    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
