//! Event loop implementation.
//!
//! This module provides the scheduler that coordinates the execution stack,
//! the microtask queue and the timer queue on a virtual clock.
//!
//! Each drive call:
//! 1. Runs the entry task (if any) to completion
//! 2. Drains all microtasks, including those queued while draining
//! 3. Advances the virtual clock to the earliest timer and runs exactly one
//!    timer callback
//! 4. Repeats from 2 until no timers remain

use crate::async_task::{AsyncSlot, TaskWaker, WakeList};
use crate::call_stack::CallStack;
use crate::config::{ConfigError, LoopConfig};
use crate::console::{Console, ConsoleWriter};
use crate::error::{LoopError, ReportedError, RunReport};
use crate::promise::{Promise, Resolution, Resolver, TrackedRejection};
use crate::task_queue::{Callback, MicrotaskQueue, Task, TaskKind};
use crate::timer_queue::{FiredTimer, TimerHandle, TimerQueue};
use core_types::{JsError, Value};
use parking_lot::Mutex;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

type IntervalCallback = Rc<RefCell<dyn FnMut(&EventLoop) -> Result<Value, JsError>>>;

#[derive(Debug, Default)]
struct RunStats {
    tasks_run: u64,
    microtasks_run: u64,
    timers_fired: u64,
}

/// State owned by one event loop. Promises keep a weak reference to it.
pub(crate) struct Shared {
    config: LoopConfig,
    clock: Cell<u64>,
    next_seq: Cell<u64>,
    driving: Cell<bool>,
    shut_down: Cell<bool>,
    stack: RefCell<CallStack>,
    microtasks: RefCell<MicrotaskQueue>,
    timers: RefCell<TimerQueue>,
    intervals: RefCell<HashMap<TimerHandle, IntervalCallback>>,
    async_tasks: RefCell<HashMap<u64, AsyncSlot>>,
    wakeups: WakeList,
    rejections: RefCell<Vec<TrackedRejection>>,
    reports: RefCell<Vec<ReportedError>>,
    stats: RefCell<RunStats>,
    console: Console,
}

impl Shared {
    pub(crate) fn next_seq(&self) -> u64 {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        seq
    }

    pub(crate) fn enqueue_microtask(&self, kind: TaskKind, callback: Callback) {
        if self.shut_down.get() {
            log::debug!("dropping {} queued after shutdown", kind);
            return;
        }
        let task = Task::from_callback(self.next_seq(), kind, callback);
        self.microtasks.borrow_mut().enqueue(task);
    }

    /// Remembers a promise rejected with no handler attached. Returns false
    /// when rejections are not reported.
    pub(crate) fn track_rejection(&self, tracked: TrackedRejection) -> bool {
        if !self.config.report_unhandled_rejections || self.shut_down.get() {
            return false;
        }
        self.rejections.borrow_mut().push(tracked);
        true
    }

    pub(crate) fn report_unhandled(&self, promise: u64, reason: JsError) {
        if self.shut_down.get() {
            return;
        }
        log::warn!("unhandled rejection of promise #{}: {}", promise, reason);
        self.report(ReportedError::UnhandledRejection { promise, reason });
    }

    fn report(&self, error: ReportedError) {
        self.reports.borrow_mut().push(error);
    }
}

/// Resets the driving flag when a drive call returns.
struct DriveGuard<'a> {
    driving: &'a Cell<bool>,
}

impl Drop for DriveGuard<'_> {
    fn drop(&mut self) {
        self.driving.set(false);
    }
}

/// The event loop.
///
/// An `EventLoop` is a cheap, cloneable handle; every task receives a
/// reference to the loop running it and may schedule more work through it.
/// Independent loops share nothing.
///
/// # Examples
///
/// ```
/// use async_runtime::EventLoop;
/// use core_types::Value;
///
/// let el = EventLoop::new();
/// let report = el
///     .run(|el| {
///         el.console().log("Start");
///         el.set_timeout(|el| {
///             el.console().log("Inside setTimeout");
///             Ok(Value::Undefined)
///         }, 0);
///         el.resolved(Value::Undefined).then(|el, _| {
///             el.console().log("Inside Promise");
///             Ok(())
///         });
///         el.console().log("End");
///         Ok(Value::Undefined)
///     })
///     .unwrap();
///
/// assert!(report.is_clean());
/// assert_eq!(
///     el.console().texts(),
///     vec!["Start", "End", "Inside Promise", "Inside setTimeout"]
/// );
/// ```
#[derive(Clone)]
pub struct EventLoop {
    shared: Rc<Shared>,
}

impl EventLoop {
    /// Creates a new EventLoop with default configuration.
    pub fn new() -> Self {
        Self::build(LoopConfig::default(), Console::new())
    }

    /// Creates an EventLoop with the given configuration.
    pub fn with_config(config: LoopConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, Console::new()))
    }

    /// Creates an EventLoop whose console also forwards to `writer`.
    pub fn with_writer(
        config: LoopConfig,
        writer: impl ConsoleWriter + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, Console::with_writer(writer)))
    }

    fn build(config: LoopConfig, console: Console) -> Self {
        let stack = CallStack::new(config.max_stack_depth);
        Self {
            shared: Rc::new(Shared {
                config,
                clock: Cell::new(0),
                next_seq: Cell::new(1),
                driving: Cell::new(false),
                shut_down: Cell::new(false),
                stack: RefCell::new(stack),
                microtasks: RefCell::new(MicrotaskQueue::new()),
                timers: RefCell::new(TimerQueue::new()),
                intervals: RefCell::new(HashMap::new()),
                async_tasks: RefCell::new(HashMap::new()),
                wakeups: Arc::new(Mutex::new(VecDeque::new())),
                rejections: RefCell::new(Vec::new()),
                reports: RefCell::new(Vec::new()),
                stats: RefCell::new(RunStats::default()),
                console,
            }),
        }
    }

    /// The configuration this loop was built with.
    pub fn config(&self) -> &LoopConfig {
        &self.shared.config
    }

    /// The ordered output sink shared by every task of this loop.
    pub fn console(&self) -> &Console {
        &self.shared.console
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.shared.clock.get()
    }

    /// Number of timers waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.shared.timers.borrow().len()
    }

    /// Number of microtasks waiting to run.
    pub fn pending_microtasks(&self) -> usize {
        self.shared.microtasks.borrow().len()
    }

    /// Returns true when no timers, microtasks or wakeups are pending.
    pub fn is_idle(&self) -> bool {
        self.shared.timers.borrow().is_empty()
            && self.shared.microtasks.borrow().is_empty()
            && self.shared.wakeups.lock().is_empty()
    }

    /// Returns true after [`shutdown`](EventLoop::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.shared.shut_down.get()
    }

    /// Current depth of the execution stack.
    pub fn stack_depth(&self) -> usize {
        self.shared.stack.borrow().depth()
    }

    // ---------------------------------------------------------------------
    // Scheduling
    // ---------------------------------------------------------------------

    /// `setTimeout(callback, delay)`: runs `f` no earlier than `delay_ms`
    /// virtual milliseconds from now. Negative delays count as zero.
    pub fn set_timeout<F>(&self, f: F, delay_ms: i64) -> TimerHandle
    where
        F: FnOnce(&EventLoop) -> Result<Value, JsError> + 'static,
    {
        let seq = self.shared.next_seq();
        let handle = TimerHandle::new(seq);
        if self.is_shut_down() {
            log::debug!("ignoring timer #{} scheduled after shutdown", seq);
            return handle;
        }
        let task = Task::new(seq, TaskKind::Timer(handle), f);
        let due = self
            .shared
            .timers
            .borrow_mut()
            .schedule(handle, task, self.now(), delay_ms);
        log::debug!("timer #{} scheduled for {}ms", seq, due);
        handle
    }

    /// `clearTimeout(handle)`: cancels a pending timer or interval.
    ///
    /// Returns false if the timer already fired or was already cancelled.
    pub fn clear_timeout(&self, handle: TimerHandle) -> bool {
        let interval = self.shared.intervals.borrow_mut().remove(&handle).is_some();
        let pending = self.shared.timers.borrow_mut().cancel(handle);
        if pending || interval {
            log::debug!("timer #{} cancelled", handle.id());
        }
        pending || interval
    }

    /// `setInterval(callback, period)`: runs `f` every `period_ms` virtual
    /// milliseconds until cleared. The period is at least 1ms.
    pub fn set_interval<F>(&self, f: F, period_ms: i64) -> TimerHandle
    where
        F: FnMut(&EventLoop) -> Result<Value, JsError> + 'static,
    {
        let handle = TimerHandle::new(self.shared.next_seq());
        if self.is_shut_down() {
            return handle;
        }
        let period = period_ms.max(1);
        let callback: IntervalCallback = Rc::new(RefCell::new(f));
        self.shared.intervals.borrow_mut().insert(handle, callback);
        self.arm_interval(handle, period);
        handle
    }

    /// `clearInterval(handle)`
    pub fn clear_interval(&self, handle: TimerHandle) -> bool {
        self.clear_timeout(handle)
    }

    fn arm_interval(&self, handle: TimerHandle, period: i64) {
        let task = Task::new(self.shared.next_seq(), TaskKind::Timer(handle), move |el| {
            el.fire_interval(handle, period)
        });
        let due = self
            .shared
            .timers
            .borrow_mut()
            .schedule(handle, task, self.now(), period);
        log::debug!("interval #{} armed for {}ms", handle.id(), due);
    }

    fn fire_interval(&self, handle: TimerHandle, period: i64) -> Result<Value, JsError> {
        let callback = self.shared.intervals.borrow().get(&handle).cloned();
        let Some(callback) = callback else {
            return Ok(Value::Undefined);
        };
        let result = {
            let mut f = callback.borrow_mut();
            (&mut *f)(self)
        };
        if self.shared.intervals.borrow().contains_key(&handle) && !self.is_shut_down() {
            self.arm_interval(handle, period);
        }
        result
    }

    /// `queueMicrotask(callback)`
    pub fn queue_microtask<F>(&self, f: F)
    where
        F: FnOnce(&EventLoop) -> Result<Value, JsError> + 'static,
    {
        self.shared
            .enqueue_microtask(TaskKind::Microtask, Box::new(f));
    }

    /// Runs `f` as a nested synchronous call named `name`.
    ///
    /// Fails with a `RangeError` if the call would exceed the configured
    /// stack depth; the enclosing task is then reported as a stack overflow
    /// even if the error is caught. An error leaving `f` without a stack
    /// trace gets the frames active at the time attached.
    pub fn call<T, F>(&self, name: &str, f: F) -> Result<T, JsError>
    where
        F: FnOnce(&EventLoop) -> Result<T, JsError>,
    {
        self.shared.stack.borrow_mut().push(name)?;
        let result = f(self);
        let frames = match &result {
            Err(error) if error.stack.is_empty() => Some(self.shared.stack.borrow().frames()),
            _ => None,
        };
        self.shared.stack.borrow_mut().pop();
        result.map_err(|error| match frames {
            Some(frames) => error.with_stack(frames),
            None => error,
        })
    }

    // ---------------------------------------------------------------------
    // Promises
    // ---------------------------------------------------------------------

    /// Creates a pending promise.
    pub fn create_promise(&self) -> Promise {
        Promise::pending(self.shared.next_seq(), Rc::downgrade(&self.shared))
    }

    /// `new Promise(executor)`
    ///
    /// The executor runs synchronously. An error returned from it rejects
    /// the promise unless the executor already settled it.
    pub fn new_promise<F>(&self, executor: F) -> Promise
    where
        F: FnOnce(&EventLoop, Resolver) -> Result<(), JsError>,
    {
        let promise = self.create_promise();
        if let Err(error) = executor(self, Resolver::new(promise.clone())) {
            promise.reject(error);
        }
        promise
    }

    /// `Promise.resolve(value)`
    pub fn resolved(&self, resolution: impl Into<Resolution>) -> Promise {
        let promise = self.create_promise();
        promise.resolve(resolution);
        promise
    }

    /// `Promise.reject(reason)`
    pub fn rejected(&self, error: JsError) -> Promise {
        let promise = self.create_promise();
        promise.reject(error);
        promise
    }

    /// A promise fulfilled with undefined after `delay_ms` virtual milliseconds.
    pub fn delay(&self, delay_ms: i64) -> Promise {
        let promise = self.create_promise();
        let resolver = Resolver::new(promise.clone());
        self.set_timeout(
            move |_| {
                resolver.resolve(Value::Undefined);
                Ok(Value::Undefined)
            },
            delay_ms,
        );
        promise
    }

    /// `Promise.all(promises)`
    ///
    /// Fulfils with an array of the values in input order once every input
    /// has fulfilled; rejects with the first rejection.
    pub fn all(&self, promises: Vec<Promise>) -> Promise {
        let result = self.create_promise();
        if promises.is_empty() {
            result.resolve(Value::Array(Vec::new()));
            return result;
        }

        let values = Rc::new(RefCell::new(vec![Value::Undefined; promises.len()]));
        let remaining = Rc::new(Cell::new(promises.len()));
        for (i, promise) in promises.iter().enumerate() {
            let values = Rc::clone(&values);
            let remaining = Rc::clone(&remaining);
            let on_fulfilled = result.clone();
            let on_rejected = result.clone();
            promise.subscribe(
                move |_, value| {
                    values.borrow_mut()[i] = value;
                    remaining.set(remaining.get() - 1);
                    if remaining.get() == 0 {
                        let values = std::mem::take(&mut *values.borrow_mut());
                        on_fulfilled.resolve(Value::Array(values));
                    }
                    Ok(())
                },
                move |_, error| {
                    on_rejected.reject(error);
                    Ok(())
                },
            );
        }
        result
    }

    /// `Promise.race(promises)`: settles like the first input to settle.
    pub fn race(&self, promises: Vec<Promise>) -> Promise {
        let result = self.create_promise();
        for promise in &promises {
            let on_fulfilled = result.clone();
            let on_rejected = result.clone();
            promise.subscribe(
                move |_, value| {
                    on_fulfilled.resolve(value);
                    Ok(())
                },
                move |_, error| {
                    on_rejected.reject(error);
                    Ok(())
                },
            );
        }
        result
    }

    // ---------------------------------------------------------------------
    // Async tasks
    // ---------------------------------------------------------------------

    /// Starts an async task, the equivalent of calling an `async function`.
    ///
    /// The body runs synchronously up to its first suspension. Each time an
    /// awaited promise settles, the body resumes in a new microtask. The
    /// returned promise settles with the body's outcome.
    ///
    /// # Examples
    ///
    /// ```
    /// use async_runtime::EventLoop;
    /// use core_types::Value;
    ///
    /// let el = EventLoop::new();
    /// let result = el.spawn_async(|el| async move {
    ///     el.delay(2000).await?;
    ///     Ok(Value::from("Data fetched successfully!"))
    /// });
    ///
    /// el.run_until_idle().unwrap();
    /// assert_eq!(result.value(), Some(Value::from("Data fetched successfully!")));
    /// assert_eq!(el.now(), 2000);
    /// ```
    pub fn spawn_async<F, Fut>(&self, f: F) -> Promise
    where
        F: FnOnce(EventLoop) -> Fut,
        Fut: Future<Output = Result<Value, JsError>> + 'static,
    {
        let promise = self.create_promise();
        let id = self.shared.next_seq();
        let slot = AsyncSlot {
            body: Box::pin(f(self.clone())),
            promise: promise.clone(),
        };
        self.shared.async_tasks.borrow_mut().insert(id, slot);
        self.poll_async(id);
        promise
    }

    fn poll_async(&self, id: u64) {
        let slot = self.shared.async_tasks.borrow_mut().remove(&id);
        let Some(mut slot) = slot else {
            return;
        };
        let waker = TaskWaker::waker(id, &self.shared.wakeups);
        let mut cx = Context::from_waker(&waker);
        match slot.body.as_mut().poll(&mut cx) {
            Poll::Ready(Ok(value)) => slot.promise.resolve(value),
            Poll::Ready(Err(error)) => slot.promise.reject(error),
            Poll::Pending => {
                if !self.is_shut_down() {
                    self.shared.async_tasks.borrow_mut().insert(id, slot);
                }
            }
        }
    }

    /// Number of async tasks currently suspended.
    pub fn suspended_async_tasks(&self) -> usize {
        self.shared.async_tasks.borrow().len()
    }

    fn flush_wakeups(&self) {
        let woken: Vec<u64> = self.shared.wakeups.lock().drain(..).collect();
        for id in woken {
            self.shared.enqueue_microtask(
                TaskKind::AsyncResume,
                Box::new(move |el| {
                    el.poll_async(id);
                    Ok(Value::Undefined)
                }),
            );
        }
    }

    // ---------------------------------------------------------------------
    // Driving
    // ---------------------------------------------------------------------

    fn begin_drive(&self) -> Result<DriveGuard<'_>, LoopError> {
        if self.is_shut_down() {
            return Err(LoopError::Shutdown);
        }
        if self.shared.driving.get() {
            return Err(LoopError::Reentrant);
        }
        self.shared.driving.set(true);
        *self.shared.stats.borrow_mut() = RunStats::default();
        Ok(DriveGuard {
            driving: &self.shared.driving,
        })
    }

    /// Collects what the current drive call did. Rejections still unhandled
    /// are reported first if the loop has nothing left to run.
    fn finish_drive(&self) -> RunReport {
        if self.is_idle() {
            self.report_unhandled_rejections();
        }
        let stats = std::mem::take(&mut *self.shared.stats.borrow_mut());
        RunReport {
            errors: std::mem::take(&mut *self.shared.reports.borrow_mut()),
            tasks_run: stats.tasks_run,
            microtasks_run: stats.microtasks_run,
            timers_fired: stats.timers_fired,
            virtual_time: self.now(),
        }
    }

    /// Runs one task to completion at the task boundary: uncaught errors
    /// and stack overflows become reports, never panics.
    fn execute(&self, task: Task) -> Result<(), LoopError> {
        let kind = task.kind();
        let seq = task.seq();
        log::trace!("running {} (seq {})", kind, seq);

        self.shared.stack.borrow_mut().enter_task(&kind.to_string());
        let result = task.run(self);
        let (overflow, frames) = {
            let mut stack = self.shared.stack.borrow_mut();
            let frames = match &result {
                Err(error) if error.stack.is_empty() => Some(stack.frames()),
                _ => None,
            };
            (stack.leave_task(), frames)
        };

        {
            let mut stats = self.shared.stats.borrow_mut();
            stats.tasks_run += 1;
            if kind.is_microtask() {
                stats.microtasks_run += 1;
            }
            if matches!(kind, TaskKind::Timer(_)) {
                stats.timers_fired += 1;
            }
        }

        if let Some(depth) = overflow {
            log::warn!("{} overflowed the stack at depth {}", kind, depth);
            if self.shared.config.abort_on_stack_overflow {
                return Err(LoopError::StackOverflow {
                    task: kind,
                    seq,
                    depth,
                    report: self.finish_drive(),
                });
            }
            self.shared.report(ReportedError::StackOverflow {
                task: kind,
                seq,
                depth,
            });
            return Ok(());
        }

        if let Err(error) = result {
            let error = match frames {
                Some(frames) => error.with_stack(frames),
                None => error,
            };
            log::error!("uncaught {} in {}", error, kind);
            self.shared
                .report(ReportedError::TaskError { task: kind, seq, error });
        }
        Ok(())
    }

    /// Drains the microtask queue until it is observed empty.
    fn drain_microtasks(&self) -> Result<(), LoopError> {
        loop {
            self.flush_wakeups();
            let next = self.shared.microtasks.borrow_mut().dequeue();
            match next {
                Some(task) => self.execute(task)?,
                None => return Ok(()),
            }
        }
    }

    /// Reports every tracked promise that is still alive and unhandled.
    /// Promises dropped earlier have already reported themselves.
    fn report_unhandled_rejections(&self) {
        let tracked = std::mem::take(&mut *self.shared.rejections.borrow_mut());
        for rejection in tracked {
            if let Some((id, reason)) = rejection.take_unhandled() {
                self.shared.report_unhandled(id, reason);
            }
        }
    }

    fn fire(&self, timer: FiredTimer) -> Result<(), LoopError> {
        if timer.due > self.now() {
            log::debug!("virtual clock {}ms -> {}ms", self.now(), timer.due);
            self.shared.clock.set(timer.due);
        }
        self.execute(timer.task)
    }

    fn check_turn_budget(&self, turns: u64) -> Result<(), LoopError> {
        match self.shared.config.max_turns {
            Some(max) if turns >= max => Err(LoopError::TurnLimitExceeded {
                turns,
                report: self.finish_drive(),
            }),
            _ => Ok(()),
        }
    }

    fn drive_to_idle(&self) -> Result<(), LoopError> {
        let mut turns = 0;
        loop {
            self.drain_microtasks()?;
            if self.shared.timers.borrow().is_empty() {
                return Ok(());
            }
            self.check_turn_budget(turns)?;
            let next = self.shared.timers.borrow_mut().pop_next();
            if let Some(timer) = next {
                self.fire(timer)?;
                turns += 1;
            }
        }
    }

    /// Runs `entry` to completion, then drives the loop until quiescent.
    ///
    /// Returns the errors reported along the way in the [`RunReport`].
    pub fn run<F>(&self, entry: F) -> Result<RunReport, LoopError>
    where
        F: FnOnce(&EventLoop) -> Result<Value, JsError> + 'static,
    {
        let _guard = self.begin_drive()?;
        let task = Task::new(self.shared.next_seq(), TaskKind::Entry, entry);
        self.execute(task)?;
        self.drive_to_idle()?;
        Ok(self.finish_drive())
    }

    /// Drives the loop until no microtasks or timers remain.
    pub fn run_until_idle(&self) -> Result<RunReport, LoopError> {
        let _guard = self.begin_drive()?;
        self.drive_to_idle()?;
        Ok(self.finish_drive())
    }

    /// Drains the microtask queue without firing any timer.
    pub fn run_microtasks(&self) -> Result<RunReport, LoopError> {
        let _guard = self.begin_drive()?;
        self.drain_microtasks()?;
        Ok(self.finish_drive())
    }

    /// One turn: drain microtasks, fire at most one timer, drain again.
    pub fn turn(&self) -> Result<RunReport, LoopError> {
        let _guard = self.begin_drive()?;
        self.drain_microtasks()?;
        let next = self.shared.timers.borrow_mut().pop_next();
        if let Some(timer) = next {
            self.fire(timer)?;
            self.drain_microtasks()?;
        }
        Ok(self.finish_drive())
    }

    /// Moves the virtual clock forward by `ms`, firing every timer due on
    /// the way (each followed by a full microtask drain).
    pub fn advance_virtual_clock(&self, ms: u64) -> Result<RunReport, LoopError> {
        let _guard = self.begin_drive()?;
        let target = self.now().saturating_add(ms);
        let mut turns = 0;
        loop {
            self.drain_microtasks()?;
            let due = self.shared.timers.borrow().peek_due();
            match due {
                Some(due) if due <= target => {
                    self.check_turn_budget(turns)?;
                    let next = self.shared.timers.borrow_mut().pop_next();
                    if let Some(timer) = next {
                        self.fire(timer)?;
                        turns += 1;
                    }
                }
                _ => break,
            }
        }
        if target > self.now() {
            log::debug!("virtual clock {}ms -> {}ms", self.now(), target);
            self.shared.clock.set(target);
        }
        Ok(self.finish_drive())
    }

    /// Tears the loop down: drops every queued task, timer, interval,
    /// suspended async task and tracked rejection. Later drive calls fail
    /// with [`LoopError::Shutdown`].
    pub fn shutdown(&self) {
        if self.shared.shut_down.replace(true) {
            return;
        }
        log::debug!("event loop shut down at {}ms", self.now());
        let microtasks = std::mem::take(&mut *self.shared.microtasks.borrow_mut());
        let timers = std::mem::take(&mut *self.shared.timers.borrow_mut());
        let intervals = std::mem::take(&mut *self.shared.intervals.borrow_mut());
        let async_tasks = std::mem::take(&mut *self.shared.async_tasks.borrow_mut());
        let rejections = std::mem::take(&mut *self.shared.rejections.borrow_mut());
        self.shared.wakeups.lock().clear();
        // Dropped outside the borrows: task closures may own promises.
        drop((microtasks, timers, intervals, async_tasks, rejections));
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("now", &self.now())
            .field("pending_timers", &self.pending_timers())
            .field("pending_microtasks", &self.pending_microtasks())
            .finish()
    }
}
