//! Unit tests for async_runtime

mod event_loop_test;
mod promise_test;
