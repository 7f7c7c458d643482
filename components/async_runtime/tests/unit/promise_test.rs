//! Unit tests for Promise

use async_runtime::{EventLoop, LoopConfig, OnRejected, PromiseState, ReportedError};
use core_types::{ErrorKind, JsError, Value};
use std::cell::RefCell;
use std::rc::Rc;

#[test]
fn reactions_run_in_registration_order() {
    let el = EventLoop::new();
    let promise = el.create_promise();
    for name in ["first", "second", "third"] {
        promise.then(move |el, _| {
            el.console().log(name);
            Ok(())
        });
    }
    promise.resolve(Value::Undefined);
    assert_eq!(el.pending_microtasks(), 3);

    el.run_microtasks().unwrap();
    assert_eq!(el.console().texts(), vec!["first", "second", "third"]);
}

#[test]
fn reaction_never_runs_inside_resolve() {
    let el = EventLoop::new();
    let promise = el.create_promise();
    let ran = Rc::new(RefCell::new(false));
    let r = ran.clone();
    promise.then(move |_, _| {
        *r.borrow_mut() = true;
        Ok(())
    });
    promise.resolve(Value::Smi(1));
    assert!(!*ran.borrow());

    el.run_microtasks().unwrap();
    assert!(*ran.borrow());
}

#[test]
fn first_settlement_wins() {
    let el = EventLoop::new();
    let promise = el.new_promise(|_, resolver| {
        resolver.resolve("Data fetched successfully!");
        resolver.reject(JsError::error("Error fetching data"));
        resolver.resolve("again");
        Ok(())
    });
    assert_eq!(
        promise.state(),
        PromiseState::Fulfilled(Value::from("Data fetched successfully!"))
    );

    let report = el.run_until_idle().unwrap();
    assert!(report.is_clean());
}

#[test]
fn executor_error_rejects_promise() {
    let el = EventLoop::new();
    let promise = el.new_promise(|_, _| Err(JsError::type_error("bad executor")));
    assert_eq!(promise.error().map(|e| e.kind), Some(ErrorKind::TypeError));
    promise.catch(|_, _| Ok(()));
    assert!(el.run_until_idle().unwrap().is_clean());
}

#[test]
fn executor_error_after_resolve_is_ignored() {
    let el = EventLoop::new();
    let promise = el.new_promise(|_, resolver| {
        resolver.resolve(Value::Smi(1));
        Err(JsError::error("too late"))
    });
    assert_eq!(promise.value(), Some(Value::Smi(1)));
}

#[test]
fn then_transforms_value() {
    let el = EventLoop::new();
    let result = el
        .resolved(Value::Smi(2))
        .then(|_, v| Ok(Value::Smi(v.as_number().unwrap_or(0.0) as i32 * 10)))
        .then(|_, v| Ok(v.to_string()));
    el.run_until_idle().unwrap();
    assert_eq!(result.value(), Some(Value::from("20")));
}

#[test]
fn missing_handlers_pass_outcome_through() {
    let el = EventLoop::new();
    let fulfilled = el
        .resolved(Value::Smi(7))
        .catch(|_, _| Ok(Value::Smi(0)));
    let rejected = el
        .rejected(JsError::error("boom"))
        .then(|_, _| Ok(Value::Smi(1)));
    let caught = rejected.catch(|_, e| Ok(e.message));

    let report = el.run_until_idle().unwrap();
    assert!(report.is_clean());
    assert_eq!(fulfilled.value(), Some(Value::Smi(7)));
    assert_eq!(rejected.error().map(|e| e.message), Some("boom".to_string()));
    assert_eq!(caught.value(), Some(Value::from("boom")));
}

#[test]
fn handler_error_rejects_derived_promise() {
    let el = EventLoop::new();
    let derived = el
        .resolved(Value::Undefined)
        .then(|_, _| -> Result<Value, JsError> { Err(JsError::range_error("out of range")) });
    derived.catch(|_, _| Ok(()));
    el.run_until_idle().unwrap();
    assert_eq!(derived.error().map(|e| e.kind), Some(ErrorKind::RangeError));
}

#[test]
fn then_or_else_picks_matching_handler() {
    let el = EventLoop::new();
    let outcome = el.rejected(JsError::error("Operation failed.")).then_or_else(
        |_, _| Ok("fulfilled"),
        |_, e| Ok(format!("rejected: {}", e.message)),
    );
    el.run_until_idle().unwrap();
    assert_eq!(outcome.value(), Some(Value::from("rejected: Operation failed.")));
}

#[test]
fn register_with_explicit_handlers() {
    let el = EventLoop::new();
    let derived = el
        .rejected(JsError::error("x"))
        .register(None, Some(OnRejected::new(|_, _| Ok(Value::Smi(3)))));
    el.run_until_idle().unwrap();
    assert_eq!(derived.value(), Some(Value::Smi(3)));
}

#[test]
fn finally_runs_on_both_outcomes_and_passes_through() {
    let el = EventLoop::new();
    let ok = el.resolved(Value::Smi(1)).finally(|el| {
        el.console().log("cleanup ok");
        Ok(())
    });
    let err = el.rejected(JsError::error("e")).finally(|el| {
        el.console().log("cleanup err");
        Ok(())
    });
    err.catch(|_, _| Ok(()));

    el.run_until_idle().unwrap();
    assert_eq!(el.console().texts(), vec!["cleanup ok", "cleanup err"]);
    assert_eq!(ok.value(), Some(Value::Smi(1)));
    assert_eq!(err.error().map(|e| e.message), Some("e".to_string()));
}

#[test]
fn resolving_with_promise_adopts_its_state() {
    let el = EventLoop::new();
    let inner = el.create_promise();
    let outer = el.create_promise();
    outer.resolve(inner.clone());
    el.run_microtasks().unwrap();
    assert!(outer.is_pending());

    inner.resolve(Value::Smi(5));
    el.run_microtasks().unwrap();
    assert_eq!(outer.value(), Some(Value::Smi(5)));
}

#[test]
fn adoption_flattens_nested_promises() {
    let el = EventLoop::new();
    let innermost = el.create_promise();
    let middle = el.resolved(innermost.clone());
    let outer = el.resolved(middle);

    innermost.reject(JsError::error("deep"));
    outer.catch(|_, _| Ok(()));
    let report = el.run_until_idle().unwrap();

    assert!(report.is_clean());
    assert_eq!(outer.error().map(|e| e.message), Some("deep".to_string()));
}

#[test]
fn unhandled_rejection_reported_once() {
    let el = EventLoop::new();
    el.rejected(JsError::error("nobody listens"));
    let report = el.run_until_idle().unwrap();
    assert_eq!(report.unhandled_rejections(), 1);
    assert!(matches!(
        report.first_error(),
        Some(ReportedError::UnhandledRejection { reason, .. }) if reason.message == "nobody listens"
    ));

    let report = el.run_until_idle().unwrap();
    assert!(report.is_clean());
}

#[test]
fn handler_attached_from_a_microtask_counts_as_handled() {
    let el = EventLoop::new();
    let report = el
        .run(|el| {
            let promise = el.rejected(JsError::error("late handler"));
            el.queue_microtask(move |_| {
                promise.catch(|_, _| Ok(()));
                Ok(Value::Undefined)
            });
            Ok(Value::Undefined)
        })
        .unwrap();
    assert!(report.is_clean());
}

#[test]
fn rejection_caught_by_a_later_timer_is_not_reported() {
    let el = EventLoop::new();
    let report = el
        .run(|el| {
            let promise = el.rejected(JsError::error("caught later"));
            el.set_timeout(
                move |_| {
                    promise.catch(|el, _| {
                        el.console().log("handled late");
                        Ok(())
                    });
                    Ok(Value::Undefined)
                },
                10,
            );
            Ok(Value::Undefined)
        })
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(el.console().texts(), vec!["handled late"]);
    assert_eq!(el.now(), 10);
}

#[test]
fn live_unhandled_rejection_waits_for_quiescence() {
    let el = EventLoop::new();
    let promise = el.rejected(JsError::error("still held"));
    el.set_timeout(|_| Ok(Value::Undefined), 10);

    assert!(el.run_microtasks().unwrap().is_clean());

    let report = el.run_until_idle().unwrap();
    assert_eq!(report.unhandled_rejections(), 1);
    match report.first_error() {
        Some(ReportedError::UnhandledRejection { promise: id, .. }) => {
            assert_eq!(*id, promise.id());
        }
        other => panic!("unexpected report {other:?}"),
    }

    drop(promise);
    assert!(el.run_until_idle().unwrap().is_clean());
}

#[test]
fn dropped_unhandled_rejection_reports_once() {
    let el = EventLoop::new();
    el.set_timeout(|_| Ok(Value::Undefined), 10);
    el.rejected(JsError::error("dropped"));

    let report = el.run_microtasks().unwrap();
    assert_eq!(report.unhandled_rejections(), 1);
    assert!(el.run_until_idle().unwrap().is_clean());
}

#[test]
fn unhandled_rejection_reporting_can_be_disabled() {
    let config = LoopConfig::default().with_report_unhandled_rejections(false);
    let el = EventLoop::with_config(config).unwrap();
    el.rejected(JsError::error("ignored"));
    assert!(el.run_until_idle().unwrap().is_clean());
}

#[test]
fn unhandled_rejection_propagates_down_the_chain() {
    let el = EventLoop::new();
    let chained = el
        .rejected(JsError::error("boom"))
        .then(|_, _| Ok(()))
        .then(|_, _| Ok(()));
    let report = el.run_until_idle().unwrap();

    assert_eq!(report.unhandled_rejections(), 1);
    match report.first_error() {
        Some(ReportedError::UnhandledRejection { promise, .. }) => {
            assert_eq!(*promise, chained.id());
        }
        other => panic!("unexpected report {other:?}"),
    }
}

#[test]
fn all_collects_values_in_input_order() {
    let el = EventLoop::new();
    let slow = el.delay(30).then(|_, _| Ok(1));
    let now = el.resolved(2);
    let fast = el.delay(10).then(|_, _| Ok(3));

    let all = el.all(vec![slow, now, fast]);
    el.run_until_idle().unwrap();

    assert_eq!(
        all.value(),
        Some(Value::Array(vec![Value::Smi(1), Value::Smi(2), Value::Smi(3)]))
    );
    assert_eq!(el.now(), 30);
}

#[test]
fn all_of_nothing_is_empty_array() {
    let el = EventLoop::new();
    let all = el.all(Vec::new());
    assert_eq!(all.value(), Some(Value::Array(Vec::new())));
}

#[test]
fn all_rejects_with_first_rejection() {
    let el = EventLoop::new();
    let never = el.create_promise();
    let failed = el.delay(5).then(|_, _| -> Result<Value, JsError> {
        Err(JsError::error("second input failed"))
    });
    let all = el.all(vec![never, failed]);
    all.catch(|_, _| Ok(()));

    let report = el.run_until_idle().unwrap();
    assert!(report.is_clean());
    assert_eq!(
        all.error().map(|e| e.message),
        Some("second input failed".to_string())
    );
}

#[test]
fn race_takes_first_settlement() {
    let el = EventLoop::new();
    let slow = el.delay(20).then(|_, _| Ok("slow"));
    let fast = el.delay(5).then(|_, _| Ok("fast"));
    let race = el.race(vec![slow, fast]);
    el.run_until_idle().unwrap();
    assert_eq!(race.value(), Some(Value::from("fast")));
}

#[test]
fn promise_ids_are_unique() {
    let el = EventLoop::new();
    let a = el.create_promise();
    let b = el.create_promise();
    assert_ne!(a.id(), b.id());
    assert!(a.ptr_eq(&a.clone()));
    assert!(!a.ptr_eq(&b));
}
