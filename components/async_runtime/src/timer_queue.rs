//! Timer queue ordered by virtual due time.
//!
//! Entries are keyed by `(due, seq)`, so timers due at the same virtual
//! instant fire in the order they were scheduled.

use crate::task_queue::Task;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Identifies a scheduled timer so it can be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wraps a raw timer id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw timer id.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A timer removed from the queue because it is the next one due.
#[derive(Debug)]
pub struct FiredTimer {
    /// Handle the timer was scheduled under
    pub handle: TimerHandle,
    /// Virtual time the timer was due at
    pub due: u64,
    /// The callback to run
    pub task: Task,
}

/// Computes a due time; negative delays count as zero.
pub fn due_time(now: u64, delay_ms: i64) -> u64 {
    now.saturating_add(delay_ms.max(0) as u64)
}

/// Pending timers, earliest first.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(u64, u64), (TimerHandle, Task)>,
    index: HashMap<TimerHandle, (u64, u64)>,
}

impl TimerQueue {
    /// Creates a new empty TimerQueue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` under `handle` to fire `delay_ms` after `now`.
    ///
    /// Returns the due time. Rescheduling a handle that is still pending
    /// replaces the old entry.
    pub fn schedule(&mut self, handle: TimerHandle, task: Task, now: u64, delay_ms: i64) -> u64 {
        let due = due_time(now, delay_ms);
        let key = (due, task.seq());
        if let Some(old) = self.index.insert(handle, key) {
            self.entries.remove(&old);
        }
        self.entries.insert(key, (handle, task));
        due
    }

    /// Removes and returns the earliest timer.
    pub fn pop_next(&mut self) -> Option<FiredTimer> {
        let ((due, _), (handle, task)) = self.entries.pop_first()?;
        self.index.remove(&handle);
        Some(FiredTimer { handle, due, task })
    }

    /// Due time of the earliest timer, if any.
    pub fn peek_due(&self) -> Option<u64> {
        self.entries.keys().next().map(|(due, _)| *due)
    }

    /// Removes a pending timer. Returns false if it already fired or was
    /// already cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.index.remove(&handle) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Returns true if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of pending timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
