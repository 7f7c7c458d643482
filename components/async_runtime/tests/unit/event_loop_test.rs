//! Unit tests for EventLoop

use async_runtime::{
    ConsoleLine, ConsoleWriter, EventLoop, LoopConfig, LoopError, ReportedError, RunReport, TaskKind,
};
use core_types::{ErrorKind, JsError, Value};
use std::cell::Cell;
use std::rc::Rc;

fn log(el: &EventLoop, text: &'static str) -> Result<Value, JsError> {
    el.console().log(text);
    Ok(Value::Undefined)
}

fn recurse(el: &EventLoop, n: u32) -> Result<Value, JsError> {
    el.call("recurse", |el| recurse(el, n + 1))
}

#[test]
fn new_event_loop_is_idle() {
    let el = EventLoop::new();
    assert!(el.is_idle());
    assert_eq!(el.pending_microtasks(), 0);
    assert_eq!(el.pending_timers(), 0);
    assert_eq!(el.now(), 0);
}

#[test]
fn entry_task_runs_synchronously_before_any_queue() {
    let el = EventLoop::new();
    el.run(|el| {
        el.queue_microtask(|el| log(el, "microtask"));
        log(el, "entry")
    })
    .unwrap();
    assert_eq!(el.console().texts(), vec!["entry", "microtask"]);
}

#[test]
fn microtasks_queued_while_draining_run_in_same_drain() {
    let el = EventLoop::new();
    el.run(|el| {
        el.set_timeout(|el| log(el, "timer"), 0);
        el.queue_microtask(|el| {
            el.queue_microtask(|el| {
                el.queue_microtask(|el| log(el, "m3"));
                log(el, "m2")
            });
            log(el, "m1")
        });
        Ok(Value::Undefined)
    })
    .unwrap();
    assert_eq!(el.console().texts(), vec!["m1", "m2", "m3", "timer"]);
}

#[test]
fn microtasks_drain_between_timers() {
    let el = EventLoop::new();
    el.run(|el| {
        el.set_timeout(
            |el| {
                el.queue_microtask(|el| log(el, "micro after first"));
                log(el, "first")
            },
            0,
        );
        el.set_timeout(|el| log(el, "second"), 0);
        Ok(Value::Undefined)
    })
    .unwrap();
    assert_eq!(
        el.console().texts(),
        vec!["first", "micro after first", "second"]
    );
}

#[test]
fn run_microtasks_does_not_fire_timers() {
    let el = EventLoop::new();
    el.set_timeout(|el| log(el, "timer"), 0);
    el.queue_microtask(|el| log(el, "micro"));

    let report = el.run_microtasks().unwrap();
    assert_eq!(report.microtasks_run, 1);
    assert_eq!(report.timers_fired, 0);
    assert_eq!(el.pending_timers(), 1);
    assert_eq!(el.console().texts(), vec!["micro"]);
}

#[test]
fn turn_fires_at_most_one_timer() {
    let el = EventLoop::new();
    el.set_timeout(|el| log(el, "a"), 5);
    el.set_timeout(|el| log(el, "b"), 5);

    let report = el.turn().unwrap();
    assert_eq!(report.timers_fired, 1);
    assert_eq!(el.console().texts(), vec!["a"]);
    assert_eq!(el.now(), 5);

    el.turn().unwrap();
    let report = el.turn().unwrap();
    assert_eq!(report.timers_fired, 0);
    assert!(el.is_idle());
}

#[test]
fn uncaught_error_terminates_only_its_task() {
    let el = EventLoop::new();
    let failing = el.set_timeout(|_| Err(JsError::type_error("x is not a function")), 0);
    el.set_timeout(|el| log(el, "still running"), 0);
    let report = el.run_until_idle().unwrap();

    assert_eq!(el.console().texts(), vec!["still running"]);
    assert_eq!(report.errors.len(), 1);
    match &report.errors[0] {
        ReportedError::TaskError { task, error, .. } => {
            assert_eq!(*task, TaskKind::Timer(failing));
            assert_eq!(error.kind, ErrorKind::TypeError);
        }
        other => panic!("unexpected report {other:?}"),
    }
}

#[test]
fn uncaught_error_gets_frames_of_nested_calls() {
    let el = EventLoop::new();
    let report = el
        .run(|el| {
            el.call("firstFunction", |el| {
                el.call("secondFunction", |_| -> Result<Value, JsError> {
                    Err(JsError::error("deep failure"))
                })
            })
        })
        .unwrap();

    let error = match report.first_error() {
        Some(ReportedError::TaskError { error, .. }) => error.clone(),
        other => panic!("unexpected report {other:?}"),
    };
    let names: Vec<String> = error.stack.iter().map(|f| f.to_string()).collect();
    assert_eq!(names, vec!["<entry>", "firstFunction", "secondFunction"]);
}

#[test]
fn call_tracks_stack_depth() {
    let el = EventLoop::new();
    let seen = Rc::new(Cell::new(0));
    let s = seen.clone();
    el.run(move |el| {
        el.call("firstFunction", |el| {
            el.call("secondFunction", |el| {
                s.set(el.stack_depth());
                Ok(())
            })
        })?;
        Ok(Value::Undefined)
    })
    .unwrap();
    assert_eq!(seen.get(), 3);
    assert_eq!(el.stack_depth(), 0);
}

#[test]
fn stack_overflow_aborts_drive_by_default() {
    let config = LoopConfig::default().with_max_stack_depth(16);
    let el = EventLoop::with_config(config).unwrap();
    let result = el.run(|el| {
        el.set_timeout(|el| log(el, "later"), 0);
        recurse(el, 0)
    });

    assert_eq!(
        result,
        Err(LoopError::StackOverflow {
            task: TaskKind::Entry,
            seq: 1,
            depth: 17,
            report: RunReport {
                tasks_run: 1,
                ..RunReport::default()
            },
        })
    );
    assert_eq!(el.pending_timers(), 1);

    el.run_until_idle().unwrap();
    assert_eq!(el.console().texts(), vec!["later"]);
}

#[test]
fn stack_overflow_abort_keeps_earlier_reports() {
    let config = LoopConfig::default().with_max_stack_depth(16);
    let el = EventLoop::with_config(config).unwrap();
    let result = el.run(|el| {
        el.queue_microtask(|_| Err(JsError::error("earlier task error")));
        el.set_timeout(|el| recurse(el, 0), 5);
        el.set_timeout(|el| log(el, "unrelated"), 10);
        Ok(Value::Undefined)
    });

    let report = match result {
        Err(LoopError::StackOverflow { task, report, .. }) => {
            assert!(matches!(task, TaskKind::Timer(_)));
            report
        }
        other => panic!("unexpected result {other:?}"),
    };
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        &report.errors[0],
        ReportedError::TaskError { task: TaskKind::Microtask, error, .. }
            if error.message == "earlier task error"
    ));
    assert_eq!(report.tasks_run, 3);
    assert_eq!(report.timers_fired, 1);
    assert_eq!(report.virtual_time, 5);

    assert_eq!(el.pending_timers(), 1);
    let resumed = el.run_until_idle().unwrap();
    assert!(resumed.is_clean());
    assert_eq!(el.console().texts(), vec!["unrelated"]);
}

#[test]
fn swallowed_stack_overflow_is_still_reported() {
    let config = LoopConfig::default()
        .with_max_stack_depth(8)
        .with_abort_on_stack_overflow(false);
    let el = EventLoop::with_config(config).unwrap();
    let report = el
        .run(|el| {
            let caught = recurse(el, 0);
            assert!(caught.is_err());
            log(el, "caught it")
        })
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].is_stack_overflow());
    assert_eq!(el.console().texts(), vec!["caught it"]);
}

#[test]
fn stack_overflow_error_is_a_range_error() {
    let config = LoopConfig::default()
        .with_max_stack_depth(4)
        .with_abort_on_stack_overflow(false);
    let el = EventLoop::with_config(config).unwrap();
    let kind = Rc::new(Cell::new(None));
    let k = kind.clone();
    el.run(move |el| {
        k.set(recurse(el, 0).err().map(|e| e.kind));
        Ok(Value::Undefined)
    })
    .unwrap();
    assert_eq!(kind.get(), Some(ErrorKind::RangeError));
}

#[test]
fn driving_from_inside_a_task_is_rejected() {
    let el = EventLoop::new();
    let results = Rc::new(std::cell::RefCell::new(Vec::new()));
    let r = results.clone();
    el.run(move |el| {
        r.borrow_mut().push(el.run_until_idle().err());
        r.borrow_mut().push(el.advance_virtual_clock(10).err());
        r.borrow_mut().push(el.turn().err());
        Ok(Value::Undefined)
    })
    .unwrap();
    assert!(results
        .borrow()
        .iter()
        .all(|e| *e == Some(LoopError::Reentrant)));
}

#[test]
fn turn_limit_stops_with_work_pending() {
    let el = EventLoop::with_config(LoopConfig::default().with_max_turns(2)).unwrap();
    for delay in [1, 2, 3] {
        el.set_timeout(|_| Ok(Value::Undefined), delay);
    }
    assert_eq!(
        el.run_until_idle(),
        Err(LoopError::TurnLimitExceeded {
            turns: 2,
            report: RunReport {
                tasks_run: 2,
                timers_fired: 2,
                virtual_time: 2,
                ..RunReport::default()
            },
        })
    );
    assert_eq!(el.pending_timers(), 1);
    assert_eq!(el.now(), 2);
}

#[test]
fn shutdown_discards_everything() {
    let el = EventLoop::new();
    el.set_interval(|_| Ok(Value::Undefined), 10);
    el.queue_microtask(|_| Ok(Value::Undefined));
    let pending = el.spawn_async(|el| async move { el.delay(100).await });

    el.shutdown();
    assert!(el.is_shut_down());
    assert!(el.is_idle());
    assert_eq!(el.suspended_async_tasks(), 0);
    assert!(pending.is_pending());
    assert_eq!(el.run(|_| Ok(Value::Undefined)), Err(LoopError::Shutdown));

    el.set_timeout(|_| Ok(Value::Undefined), 0);
    assert_eq!(el.pending_timers(), 0);
}

#[test]
fn independent_loops_share_nothing() {
    let a = EventLoop::new();
    let b = EventLoop::new();
    a.set_timeout(|el| log(el, "a"), 50);
    b.run_until_idle().unwrap();
    assert_eq!(a.pending_timers(), 1);
    assert_eq!(b.now(), 0);
    assert!(b.console().is_empty());
}

#[test]
fn report_counts_work_of_one_drive_call() {
    let el = EventLoop::new();
    let report = el
        .run(|el| {
            el.queue_microtask(|_| Ok(Value::Undefined));
            el.set_timeout(|_| Ok(Value::Undefined), 7);
            Ok(Value::Undefined)
        })
        .unwrap();
    assert_eq!(report.tasks_run, 3);
    assert_eq!(report.microtasks_run, 1);
    assert_eq!(report.timers_fired, 1);
    assert_eq!(report.virtual_time, 7);

    let report = el.run_until_idle().unwrap();
    assert_eq!(report.tasks_run, 0);
}

struct Recording(Rc<std::cell::RefCell<Vec<String>>>);

impl ConsoleWriter for Recording {
    fn write(&self, line: &ConsoleLine) {
        self.0.borrow_mut().push(line.text.clone());
    }
}

#[test]
fn installed_writer_sees_lines_as_they_are_emitted() {
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let el = EventLoop::with_writer(LoopConfig::default(), Recording(seen.clone())).unwrap();
    let observed = seen.clone();
    el.run(move |el| {
        el.set_timeout(|el| log(el, "timer"), 0);
        log(el, "entry")?;
        assert_eq!(*observed.borrow(), vec!["entry"]);
        Ok(Value::Undefined)
    })
    .unwrap();
    assert_eq!(*seen.borrow(), vec!["entry", "timer"]);
    assert_eq!(el.console().texts(), *seen.borrow());
}
