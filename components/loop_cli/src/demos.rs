//! Built-in demos.
//!
//! Each demo is an entry task that reproduces one classic lesson about
//! asynchronous ordering: the call stack, the callback queue, the event
//! loop, nested callbacks, promises and async functions. `fail` switches a
//! demo to its failure path.

use async_runtime::{Console, EventLoop, LoopError, Promise, RunReport};
use clap::ValueEnum;
use core_types::{JsError, Value};

type Entry = fn(&EventLoop, bool) -> Result<Value, JsError>;

/// A built-in demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Nested synchronous calls on the execution stack
    CallStack,
    /// A timer callback runs after the synchronous code
    CallbackQueue,
    /// Microtasks run before timers
    EventLoop,
    /// Nested callbacks, then the same work as a promise chain
    CallbackHell,
    /// A promise with then/catch
    Promise,
    /// An async task awaiting a timer-backed promise
    AsyncAwait,
    /// Settling a promise twice keeps the first outcome
    DoubleSettle,
}

impl Demo {
    /// Every demo, in listing order.
    pub const ALL: [Demo; 7] = [
        Demo::CallStack,
        Demo::CallbackQueue,
        Demo::EventLoop,
        Demo::CallbackHell,
        Demo::Promise,
        Demo::AsyncAwait,
        Demo::DoubleSettle,
    ];

    /// Name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Demo::CallStack => "call-stack",
            Demo::CallbackQueue => "callback-queue",
            Demo::EventLoop => "event-loop",
            Demo::CallbackHell => "callback-hell",
            Demo::Promise => "promise",
            Demo::AsyncAwait => "async-await",
            Demo::DoubleSettle => "double-settle",
        }
    }

    /// One-line description for `vloop list`.
    pub fn description(self) -> &'static str {
        match self {
            Demo::CallStack => "nested calls push and pop stack frames (--fail: unbounded recursion)",
            Demo::CallbackQueue => "setTimeout runs after the synchronous code (--fail: callback throws)",
            Demo::EventLoop => "promise reactions run before a 0ms timer (--fail: unhandled rejection)",
            Demo::CallbackHell => "four dependent tasks as nested callbacks and as a promise chain",
            Demo::Promise => "then/catch on a promise settled by its executor",
            Demo::AsyncAwait => "an async task awaits data delivered by a 2000ms timer",
            Demo::DoubleSettle => "resolve and reject on one promise: the first settlement wins",
        }
    }

    fn entry(self) -> Entry {
        match self {
            Demo::CallStack => call_stack,
            Demo::CallbackQueue => callback_queue,
            Demo::EventLoop => event_loop,
            Demo::CallbackHell => callback_hell,
            Demo::Promise => promise,
            Demo::AsyncAwait => async_await,
            Demo::DoubleSettle => double_settle,
        }
    }

    /// Runs the demo to quiescence on `el`.
    pub fn run(self, el: &EventLoop, fail: bool) -> Result<RunReport, LoopError> {
        let entry = self.entry();
        el.run(move |el| entry(el, fail))
    }
}

fn call_stack(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    el.call("firstFunction", |el| first_function(el, fail))?;
    Ok(Value::Undefined)
}

fn first_function(el: &EventLoop, fail: bool) -> Result<(), JsError> {
    el.console().log("First function start");
    el.call("secondFunction", |el| second_function(el, fail))?;
    el.console().log("First function end");
    Ok(())
}

fn second_function(el: &EventLoop, fail: bool) -> Result<(), JsError> {
    el.console().log("Second function start");
    el.call("thirdFunction", |el| third_function(el, fail))?;
    el.console().log("Second function end");
    Ok(())
}

fn third_function(el: &EventLoop, fail: bool) -> Result<(), JsError> {
    if fail {
        return el.call("thirdFunction", |el| third_function(el, fail));
    }
    el.console().log("Third function start");
    el.console().log("Third function end");
    Ok(())
}

fn callback_queue(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    el.console().log("Start");
    el.set_timeout(
        move |el| {
            if fail {
                return Err(JsError::type_error("callback is not a function"));
            }
            el.console().log("Inside setTimeout callback");
            Ok(Value::Undefined)
        },
        1000,
    );
    el.console().log("End");
    Ok(Value::Undefined)
}

fn event_loop(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    el.console().log("Start");
    el.set_timeout(
        |el| {
            el.console().log("Inside setTimeout");
            Ok(Value::Undefined)
        },
        0,
    );
    let settled = if fail {
        el.rejected(JsError::error("Promise rejected"))
    } else {
        el.resolved(Value::Undefined)
    };
    settled.then(|el, _| {
        el.console().log("Inside Promise");
        Ok(())
    });
    el.console().log("End");
    Ok(Value::Undefined)
}

const TASK_DELAY_MS: i64 = 100;

fn task_result(n: u32, input: &Value) -> Value {
    match input {
        Value::Undefined => Value::from(format!("result{n}")),
        previous => Value::from(format!("{previous} -> result{n}")),
    }
}

fn task_error(n: u32) -> JsError {
    JsError::error(format!("doTask{n} failed"))
}

/// Callback style: `doTask(input, callback)` calls back after a delay.
fn do_task<F>(el: &EventLoop, n: u32, input: Value, fail: bool, callback: F)
where
    F: FnOnce(&EventLoop, Value) -> Result<Value, JsError> + 'static,
{
    el.set_timeout(
        move |el| {
            if fail && n == 3 {
                return Err(task_error(n));
            }
            callback(el, task_result(n, &input))
        },
        TASK_DELAY_MS,
    );
}

/// Promise style: the same task returning a promise.
fn task_promise(el: &EventLoop, n: u32, input: Value, fail: bool) -> Promise {
    el.new_promise(move |el, resolver| {
        el.set_timeout(
            move |_| {
                if fail && n == 3 {
                    resolver.reject(task_error(n));
                } else {
                    resolver.resolve(task_result(n, &input));
                }
                Ok(Value::Undefined)
            },
            TASK_DELAY_MS,
        );
        Ok(())
    })
}

fn callback_hell(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    do_task(el, 1, Value::Undefined, fail, move |el, result1| {
        do_task(el, 2, result1, fail, move |el, result2| {
            do_task(el, 3, result2, fail, move |el, result3| {
                do_task(el, 4, result3, fail, move |el, result4| {
                    el.console()
                        .log_values(&[Value::from("Final result:"), result4]);
                    promise_chain(el, fail);
                    Ok(Value::Undefined)
                });
                Ok(Value::Undefined)
            });
            Ok(Value::Undefined)
        });
        Ok(Value::Undefined)
    });
    Ok(Value::Undefined)
}

fn promise_chain(el: &EventLoop, fail: bool) {
    task_promise(el, 1, Value::Undefined, fail)
        .then(move |el, result1| Ok(task_promise(el, 2, result1, fail)))
        .then(move |el, result2| Ok(task_promise(el, 3, result2, fail)))
        .then(move |el, result3| Ok(task_promise(el, 4, result3, fail)))
        .then(|el, result4| {
            el.console()
                .log_values(&[Value::from("Final result (promise chain):"), result4]);
            Ok(())
        })
        .catch(|el, error| {
            el.console().error(format!("Error: {}", error.message));
            Ok(())
        });
}

fn promise(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    let operation = el.new_promise(move |_, resolver| {
        if fail {
            resolver.reject(JsError::error("Operation failed."));
        } else {
            resolver.resolve("Operation completed successfully!");
        }
        Ok(())
    });

    operation
        .then(|el, result| {
            el.console().log_values(&[Value::from("Success: "), result]);
            Ok(())
        })
        .catch(|el, error| {
            el.console().error(Console::format_values(&[
                Value::from("Error: "),
                Value::from(error.message),
            ]));
            Ok(())
        });
    Ok(Value::Undefined)
}

fn fetch_data(el: &EventLoop, fail: bool) -> Promise {
    el.new_promise(move |el, resolver| {
        el.set_timeout(
            move |_| {
                if !fail {
                    resolver.resolve("Data fetched successfully!");
                }
                // Ignored once resolved.
                resolver.reject(JsError::error("It failed"));
                Ok(Value::Undefined)
            },
            2000,
        );
        Ok(())
    })
}

fn async_await(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    el.console().log("Fetching data...");
    el.spawn_async(move |el| async move {
        match fetch_data(&el, fail).await {
            Ok(data) => el.console().log_values(&[Value::from("result:"), data]),
            Err(error) => el.console().error(format!("Error: {}", error.message)),
        }
        Ok(Value::Undefined)
    });
    Ok(Value::Undefined)
}

fn double_settle(el: &EventLoop, fail: bool) -> Result<Value, JsError> {
    let settled = el.new_promise(move |_, resolver| {
        if fail {
            resolver.reject(JsError::error("first"));
            resolver.resolve("second");
        } else {
            resolver.resolve("first");
            resolver.reject(JsError::error("second"));
        }
        Ok(())
    });

    settled.then_or_else(
        |el, value| {
            el.console().log(format!("fulfilled with {value}"));
            Ok(())
        },
        |el, error| {
            el.console().log(format!("rejected with {}", error.message));
            Ok(())
        },
    );
    Ok(Value::Undefined)
}
