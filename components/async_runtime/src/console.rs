//! Ordered output sink.
//!
//! Tasks print through a [`Console`] instead of stdout. Every line is kept in
//! emission order so tests can assert the exact interleaving, and is also
//! forwarded to a [`ConsoleWriter`].

use core_types::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Which console method produced a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    /// console.log
    Log,
    /// console.info
    Info,
    /// console.warn
    Warn,
    /// console.error
    Error,
}

/// One emitted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    /// Method that produced the line
    pub level: ConsoleLevel,
    /// The formatted text
    pub text: String,
}

impl fmt::Display for ConsoleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Console output writer trait
pub trait ConsoleWriter {
    /// Write one line to the console output
    fn write(&self, line: &ConsoleLine);
}

/// Writer that only keeps the in-memory log.
#[derive(Debug, Default)]
pub struct CaptureWriter;

impl ConsoleWriter for CaptureWriter {
    fn write(&self, _line: &ConsoleLine) {}
}

/// Console object shared by every task of one event loop.
#[derive(Clone)]
pub struct Console {
    lines: Rc<RefCell<Vec<ConsoleLine>>>,
    writer: Rc<dyn ConsoleWriter>,
}

impl Console {
    /// Create a console that only captures output
    pub fn new() -> Self {
        Self::with_writer(CaptureWriter)
    }

    /// Create a console that also forwards every line to `writer`
    pub fn with_writer(writer: impl ConsoleWriter + 'static) -> Self {
        Self {
            lines: Rc::new(RefCell::new(Vec::new())),
            writer: Rc::new(writer),
        }
    }

    fn emit(&self, level: ConsoleLevel, text: String) {
        let line = ConsoleLine { level, text };
        self.writer.write(&line);
        self.lines.borrow_mut().push(line);
    }

    /// Format values the way `console.log(a, b)` does
    pub fn format_values(values: &[Value]) -> String {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// console.log(message)
    pub fn log(&self, message: impl fmt::Display) {
        self.emit(ConsoleLevel::Log, message.to_string());
    }

    /// console.log(...values)
    pub fn log_values(&self, values: &[Value]) {
        self.emit(ConsoleLevel::Log, Self::format_values(values));
    }

    /// console.info(message)
    pub fn info(&self, message: impl fmt::Display) {
        self.emit(ConsoleLevel::Info, message.to_string());
    }

    /// console.warn(message)
    pub fn warn(&self, message: impl fmt::Display) {
        self.emit(ConsoleLevel::Warn, message.to_string());
    }

    /// console.error(message)
    pub fn error(&self, message: impl fmt::Display) {
        self.emit(ConsoleLevel::Error, message.to_string());
    }

    /// Every line emitted so far, in order
    pub fn lines(&self) -> Vec<ConsoleLine> {
        self.lines.borrow().clone()
    }

    /// The text of every line emitted so far, in order
    pub fn texts(&self) -> Vec<String> {
        self.lines.borrow().iter().map(|l| l.text.clone()).collect()
    }

    /// Number of lines emitted so far
    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    /// Returns true if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    /// Forget the captured lines
    pub fn clear(&self) {
        self.lines.borrow_mut().clear();
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Console {{ lines: {} }}", self.len())
    }
}
