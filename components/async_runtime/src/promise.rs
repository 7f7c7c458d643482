//! Promise implementation following the Promise/A+ model.
//!
//! A [`Promise`] is a shared handle to a settlement record. Settling a promise
//! never runs user code inline: each registered reaction is turned into a
//! microtask on the owning event loop, in registration order.

use crate::event_loop::Shared;
use crate::task_queue::TaskKind;
use crate::EventLoop;
use core_types::{JsError, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// The state of a Promise.
///
/// Once settled (Fulfilled or Rejected), a Promise cannot change state.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// The initial state; the promise is neither fulfilled nor rejected.
    Pending,
    /// The promise has been fulfilled with a value.
    Fulfilled(Value),
    /// The promise has been rejected with an error.
    Rejected(JsError),
}

impl PromiseState {
    /// Returns true unless the state is Pending.
    pub fn is_settled(&self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}

/// What a promise is resolved with: a plain value, or another promise whose
/// settlement it adopts.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Fulfil with this value
    Value(Value),
    /// Follow this promise
    Promise(Promise),
}

impl From<Value> for Resolution {
    fn from(value: Value) -> Self {
        Resolution::Value(value)
    }
}

impl From<Promise> for Resolution {
    fn from(promise: Promise) -> Self {
        Resolution::Promise(promise)
    }
}

impl From<()> for Resolution {
    fn from(_: ()) -> Self {
        Resolution::Value(Value::Undefined)
    }
}

impl From<&str> for Resolution {
    fn from(s: &str) -> Self {
        Resolution::Value(Value::from(s))
    }
}

impl From<String> for Resolution {
    fn from(s: String) -> Self {
        Resolution::Value(Value::from(s))
    }
}

impl From<i32> for Resolution {
    fn from(n: i32) -> Self {
        Resolution::Value(Value::Smi(n))
    }
}

impl From<bool> for Resolution {
    fn from(b: bool) -> Self {
        Resolution::Value(Value::Boolean(b))
    }
}

impl From<f64> for Resolution {
    fn from(n: f64) -> Self {
        Resolution::Value(Value::Double(n))
    }
}

type FulfillFn = Box<dyn FnOnce(&EventLoop, Value) -> Result<Resolution, JsError>>;
type RejectFn = Box<dyn FnOnce(&EventLoop, JsError) -> Result<Resolution, JsError>>;

/// A fulfilment handler, the first argument of `.then()`.
pub struct OnFulfilled(FulfillFn);

impl OnFulfilled {
    /// Wraps a closure receiving the fulfilment value.
    pub fn new<F, R>(f: F) -> Self
    where
        F: FnOnce(&EventLoop, Value) -> Result<R, JsError> + 'static,
        R: Into<Resolution>,
    {
        Self(Box::new(move |el, value| f(el, value).map(Into::into)))
    }
}

impl fmt::Debug for OnFulfilled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OnFulfilled {{ ... }}")
    }
}

/// A rejection handler, the second argument of `.then()`.
pub struct OnRejected(RejectFn);

impl OnRejected {
    /// Wraps a closure receiving the rejection reason.
    pub fn new<F, R>(f: F) -> Self
    where
        F: FnOnce(&EventLoop, JsError) -> Result<R, JsError> + 'static,
        R: Into<Resolution>,
    {
        Self(Box::new(move |el, error| f(el, error).map(Into::into)))
    }
}

impl fmt::Debug for OnRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OnRejected {{ ... }}")
    }
}

/// A reaction to be triggered when a Promise settles.
///
/// `derived` is the promise returned by `.then()`; internal subscriptions
/// (adoption, `await`, combinators) have none.
#[derive(Debug)]
pub struct PromiseReaction {
    on_fulfilled: Option<OnFulfilled>,
    on_rejected: Option<OnRejected>,
    derived: Option<Promise>,
}

impl PromiseReaction {
    fn run(self, el: &EventLoop, outcome: Result<Value, JsError>) -> Result<Value, JsError> {
        let result = match outcome {
            Ok(value) => match self.on_fulfilled {
                Some(handler) => (handler.0)(el, value),
                None => Ok(Resolution::Value(value)),
            },
            Err(error) => match self.on_rejected {
                Some(handler) => (handler.0)(el, error),
                None => Err(error),
            },
        };

        match self.derived {
            Some(derived) => {
                match result {
                    Ok(resolution) => derived.resolve(resolution),
                    Err(error) => derived.reject(error),
                }
                Ok(Value::Undefined)
            }
            None => result.map(|_| Value::Undefined),
        }
    }
}

struct PromiseRecord {
    id: u64,
    state: PromiseState,
    reactions: Vec<PromiseReaction>,
    handled: bool,
    locked: bool,
    tracked: bool,
    reported: bool,
    host: Weak<Shared>,
}

impl PromiseRecord {
    /// Marks an unhandled rejection as reported. Returns None if it was
    /// handled meanwhile, never tracked or already reported.
    fn take_unhandled(&mut self) -> Option<(u64, JsError)> {
        if !self.tracked || self.handled || self.reported {
            return None;
        }
        match &self.state {
            PromiseState::Rejected(error) => {
                self.reported = true;
                Some((self.id, error.clone()))
            }
            _ => None,
        }
    }
}

impl Drop for PromiseRecord {
    // The last handle is gone, so no handler can be attached any more.
    fn drop(&mut self) {
        if let Some((id, reason)) = self.take_unhandled() {
            if let Some(shared) = self.host.upgrade() {
                shared.report_unhandled(id, reason);
            }
        }
    }
}

/// A weak entry in the loop's list of rejected, unhandled promises.
///
/// It does not keep the promise alive: a promise dropped while still
/// unhandled reports itself.
pub(crate) struct TrackedRejection(Weak<RefCell<PromiseRecord>>);

impl TrackedRejection {
    /// Marks the promise as reported if it is still alive and unhandled.
    pub(crate) fn take_unhandled(&self) -> Option<(u64, JsError)> {
        let record = self.0.upgrade()?;
        let taken = record.borrow_mut().take_unhandled();
        taken
    }
}

/// A promise.
///
/// Promises are created through an [`EventLoop`] and are cheap to clone; all
/// clones refer to the same settlement record.
///
/// # Examples
///
/// ```
/// use async_runtime::{EventLoop, PromiseState};
/// use core_types::Value;
///
/// let el = EventLoop::new();
/// let promise = el.create_promise();
/// assert_eq!(promise.state(), PromiseState::Pending);
///
/// promise.resolve(Value::Smi(42));
/// assert_eq!(promise.state(), PromiseState::Fulfilled(Value::Smi(42)));
///
/// // Later settlements are ignored.
/// promise.resolve(Value::Smi(100));
/// assert_eq!(promise.value(), Some(Value::Smi(42)));
/// ```
#[derive(Clone)]
pub struct Promise {
    record: Rc<RefCell<PromiseRecord>>,
}

impl Promise {
    pub(crate) fn pending(id: u64, host: Weak<Shared>) -> Self {
        Self {
            record: Rc::new(RefCell::new(PromiseRecord {
                id,
                state: PromiseState::Pending,
                reactions: Vec::new(),
                handled: false,
                locked: false,
                tracked: false,
                reported: false,
                host,
            })),
        }
    }

    fn host(&self) -> Option<Rc<Shared>> {
        self.record.borrow().host.upgrade()
    }

    /// Id of this promise, unique within its event loop.
    pub fn id(&self) -> u64 {
        self.record.borrow().id
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.record.borrow().state.clone()
    }

    /// Returns true while the promise is neither fulfilled nor rejected.
    pub fn is_pending(&self) -> bool {
        matches!(self.record.borrow().state, PromiseState::Pending)
    }

    /// The fulfilment value, if fulfilled.
    pub fn value(&self) -> Option<Value> {
        match &self.record.borrow().state {
            PromiseState::Fulfilled(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// The rejection reason, if rejected.
    pub fn error(&self) -> Option<JsError> {
        match &self.record.borrow().state {
            PromiseState::Rejected(error) => Some(error.clone()),
            _ => None,
        }
    }

    /// Returns true once any reaction has been registered.
    pub fn is_handled(&self) -> bool {
        self.record.borrow().handled
    }

    /// Returns true if both handles refer to the same promise.
    pub fn ptr_eq(&self, other: &Promise) -> bool {
        Rc::ptr_eq(&self.record, &other.record)
    }

    /// Resolves the Promise.
    ///
    /// A value fulfils it; another promise makes it follow that promise's
    /// eventual settlement. Resolving a promise with itself rejects it with
    /// a `TypeError`. No-op if the promise is already settled or already
    /// following another promise.
    pub fn resolve(&self, resolution: impl Into<Resolution>) {
        {
            let record = self.record.borrow();
            if record.locked || record.state.is_settled() {
                return;
            }
        }

        match resolution.into() {
            Resolution::Value(value) => {
                self.settle(PromiseState::Fulfilled(value));
            }
            Resolution::Promise(inner) if inner.ptr_eq(self) => {
                self.settle(PromiseState::Rejected(JsError::type_error(
                    "Chaining cycle detected for promise",
                )));
            }
            Resolution::Promise(inner) => {
                self.record.borrow_mut().locked = true;
                log::trace!("promise #{} follows promise #{}", self.id(), inner.id());
                let on_fulfilled = self.clone();
                let on_rejected = self.clone();
                inner.subscribe(
                    move |_, value| {
                        on_fulfilled.settle(PromiseState::Fulfilled(value));
                        Ok(())
                    },
                    move |_, error| {
                        on_rejected.settle(PromiseState::Rejected(error));
                        Ok(())
                    },
                );
            }
        }
    }

    /// Rejects the Promise with an error.
    ///
    /// If the Promise is already settled or following another promise, this
    /// is a no-op.
    pub fn reject(&self, error: JsError) {
        if self.record.borrow().locked {
            return;
        }
        self.settle(PromiseState::Rejected(error));
    }

    /// Moves a pending promise to its final state and queues its reactions.
    fn settle(&self, state: PromiseState) -> bool {
        let (reactions, outcome, unhandled) = {
            let mut record = self.record.borrow_mut();
            if record.state.is_settled() {
                return false;
            }
            let outcome = match &state {
                PromiseState::Fulfilled(value) => Ok(value.clone()),
                PromiseState::Rejected(error) => Err(error.clone()),
                PromiseState::Pending => return false,
            };
            record.state = state;
            let unhandled = outcome.is_err() && !record.handled;
            (std::mem::take(&mut record.reactions), outcome, unhandled)
        };

        log::trace!(
            "promise #{} settled ({}), {} reactions queued",
            self.id(),
            if outcome.is_ok() { "fulfilled" } else { "rejected" },
            reactions.len()
        );

        if unhandled {
            if let Some(shared) = self.host() {
                let tracked = TrackedRejection(Rc::downgrade(&self.record));
                if shared.track_rejection(tracked) {
                    self.record.borrow_mut().tracked = true;
                }
            }
        }
        for reaction in reactions {
            self.enqueue_reaction(reaction, outcome.clone());
        }
        true
    }

    fn enqueue_reaction(&self, reaction: PromiseReaction, outcome: Result<Value, JsError>) {
        match self.host() {
            Some(shared) => {
                shared.enqueue_microtask(
                    TaskKind::Reaction,
                    Box::new(move |el| reaction.run(el, outcome)),
                );
            }
            None => log::warn!(
                "promise #{} settled after its event loop was dropped",
                self.id()
            ),
        }
    }

    fn add_reaction(&self, reaction: PromiseReaction) {
        let outcome = {
            let mut record = self.record.borrow_mut();
            record.handled = true;
            match &record.state {
                PromiseState::Pending => {
                    record.reactions.push(reaction);
                    return;
                }
                PromiseState::Fulfilled(value) => Ok(value.clone()),
                PromiseState::Rejected(error) => Err(error.clone()),
            }
        };
        self.enqueue_reaction(reaction, outcome);
    }

    fn derived(&self) -> Promise {
        match self.host() {
            Some(shared) => Promise::pending(shared.next_seq(), Rc::downgrade(&shared)),
            None => Promise::pending(0, Weak::new()),
        }
    }

    /// Registers a reaction pair and returns the derived promise.
    ///
    /// The derived promise settles with the outcome of whichever handler runs;
    /// a missing handler passes the value or error through unchanged. If this
    /// promise is already settled, the reaction is queued as a microtask
    /// immediately; it never runs inside this call.
    pub fn register(
        &self,
        on_fulfilled: Option<OnFulfilled>,
        on_rejected: Option<OnRejected>,
    ) -> Promise {
        let derived = self.derived();
        self.add_reaction(PromiseReaction {
            on_fulfilled,
            on_rejected,
            derived: Some(derived.clone()),
        });
        derived
    }

    /// `.then(onFulfilled)`
    pub fn then<F, R>(&self, on_fulfilled: F) -> Promise
    where
        F: FnOnce(&EventLoop, Value) -> Result<R, JsError> + 'static,
        R: Into<Resolution>,
    {
        self.register(Some(OnFulfilled::new(on_fulfilled)), None)
    }

    /// `.then(onFulfilled, onRejected)`
    pub fn then_or_else<F, G, R1, R2>(&self, on_fulfilled: F, on_rejected: G) -> Promise
    where
        F: FnOnce(&EventLoop, Value) -> Result<R1, JsError> + 'static,
        G: FnOnce(&EventLoop, JsError) -> Result<R2, JsError> + 'static,
        R1: Into<Resolution>,
        R2: Into<Resolution>,
    {
        self.register(
            Some(OnFulfilled::new(on_fulfilled)),
            Some(OnRejected::new(on_rejected)),
        )
    }

    /// `.catch(onRejected)`
    pub fn catch<G, R>(&self, on_rejected: G) -> Promise
    where
        G: FnOnce(&EventLoop, JsError) -> Result<R, JsError> + 'static,
        R: Into<Resolution>,
    {
        self.register(None, Some(OnRejected::new(on_rejected)))
    }

    /// `.finally(onFinally)`
    ///
    /// Runs `on_finally` on either outcome and passes the original outcome
    /// through, unless `on_finally` itself fails.
    pub fn finally<F>(&self, on_finally: F) -> Promise
    where
        F: FnOnce(&EventLoop) -> Result<(), JsError> + 'static,
    {
        let slot = Rc::new(RefCell::new(Some(on_finally)));
        let other = Rc::clone(&slot);
        self.then_or_else(
            move |el, value| {
                if let Some(f) = slot.borrow_mut().take() {
                    f(el)?;
                }
                Ok(value)
            },
            move |el, error| -> Result<Value, JsError> {
                if let Some(f) = other.borrow_mut().take() {
                    f(el)?;
                }
                Err(error)
            },
        )
    }

    /// Registers internal handlers without creating a derived promise.
    pub(crate) fn subscribe<F, G>(&self, on_fulfilled: F, on_rejected: G)
    where
        F: FnOnce(&EventLoop, Value) -> Result<(), JsError> + 'static,
        G: FnOnce(&EventLoop, JsError) -> Result<(), JsError> + 'static,
    {
        self.add_reaction(PromiseReaction {
            on_fulfilled: Some(OnFulfilled::new(on_fulfilled)),
            on_rejected: Some(OnRejected::new(on_rejected)),
            derived: None,
        });
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record.borrow();
        f.debug_struct("Promise")
            .field("id", &record.id)
            .field("state", &record.state)
            .field("reactions", &record.reactions.len())
            .finish()
    }
}

/// The resolving functions handed to a promise executor.
///
/// Cloneable and `'static`, so it can be moved into timer callbacks.
#[derive(Debug, Clone)]
pub struct Resolver {
    promise: Promise,
}

impl Resolver {
    pub(crate) fn new(promise: Promise) -> Self {
        Self { promise }
    }

    /// `resolve(value)`
    pub fn resolve(&self, resolution: impl Into<Resolution>) {
        self.promise.resolve(resolution);
    }

    /// `reject(reason)`
    pub fn reject(&self, error: JsError) {
        self.promise.reject(error);
    }

    /// The promise this resolver settles.
    pub fn promise(&self) -> &Promise {
        &self.promise
    }
}
