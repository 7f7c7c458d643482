//! `async`/`await` on top of promises.
//!
//! Awaiting a [`Promise`] registers an internal reaction that wakes the
//! awaiting task. Wakes are collected in a thread-safe list (a
//! [`Waker`] must be `Send + Sync`) and turned into resume microtasks by the
//! event loop, so a suspended task always continues as a fresh microtask.

use crate::promise::{Promise, PromiseState};
use core_types::{JsError, Value};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

/// Boxed body of an async task.
pub type AsyncBody = Pin<Box<dyn Future<Output = Result<Value, JsError>>>>;

/// A suspended async task and the promise its outcome settles.
pub(crate) struct AsyncSlot {
    pub(crate) body: AsyncBody,
    pub(crate) promise: Promise,
}

/// Ids of async tasks woken since the last flush.
pub(crate) type WakeList = Arc<Mutex<VecDeque<u64>>>;

pub(crate) struct TaskWaker {
    id: u64,
    wakeups: WakeList,
}

impl TaskWaker {
    pub(crate) fn waker(id: u64, wakeups: &WakeList) -> Waker {
        Waker::from(Arc::new(TaskWaker {
            id,
            wakeups: Arc::clone(wakeups),
        }))
    }
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.wakeups.lock().push_back(self.id);
    }
}

/// Future returned by awaiting a [`Promise`].
///
/// Resolves to the fulfilment value, or to the rejection reason as `Err` so
/// that `?` rethrows it inside the awaiting task.
pub struct PromiseFuture {
    promise: Promise,
    waker: Option<Rc<RefCell<Option<Waker>>>>,
}

impl PromiseFuture {
    fn new(promise: Promise) -> Self {
        Self {
            promise,
            waker: None,
        }
    }
}

impl Future for PromiseFuture {
    type Output = Result<Value, JsError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &this.waker {
            // First poll always suspends, even on a settled promise.
            None => {
                let slot = Rc::new(RefCell::new(Some(cx.waker().clone())));
                let on_fulfilled = Rc::clone(&slot);
                let on_rejected = Rc::clone(&slot);
                this.promise.subscribe(
                    move |_, _| {
                        if let Some(waker) = on_fulfilled.borrow_mut().take() {
                            waker.wake();
                        }
                        Ok(())
                    },
                    move |_, _| {
                        if let Some(waker) = on_rejected.borrow_mut().take() {
                            waker.wake();
                        }
                        Ok(())
                    },
                );
                this.waker = Some(slot);
                Poll::Pending
            }
            Some(slot) => match this.promise.state() {
                PromiseState::Fulfilled(value) => Poll::Ready(Ok(value)),
                PromiseState::Rejected(error) => Poll::Ready(Err(error)),
                PromiseState::Pending => {
                    *slot.borrow_mut() = Some(cx.waker().clone());
                    Poll::Pending
                }
            },
        }
    }
}

impl fmt::Debug for PromiseFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromiseFuture")
            .field("promise", &self.promise)
            .field("subscribed", &self.waker.is_some())
            .finish()
    }
}

impl IntoFuture for Promise {
    type Output = Result<Value, JsError>;
    type IntoFuture = PromiseFuture;

    fn into_future(self) -> Self::IntoFuture {
        PromiseFuture::new(self)
    }
}
