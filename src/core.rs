//! Core domain types for Telegramable
//!
//! An [`ErrorEvent`] is the captured description of one failure: what kind of
//! error it was, where it happened, and the call stack that led to it. Events
//! are built by the host (directly, from a Rust error, or from a panic) and
//! handed to the notifier, which never mutates them.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::panic::Location;

/// Class name used for events captured by the panic hook.
pub const PANIC_CLASS: &str = "panic";

/// One entry of a captured call stack.
///
/// Attributes keep their insertion order so that a frame renders the same way
/// it was recorded (`function`, then `file`, then `line`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    fields: Vec<(String, String)>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute to the frame.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Returns the first value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Frame {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter().fold(Frame::new(), |frame, (k, v)| frame.with(k, v))
    }
}

/// A captured application error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Identifier of the error kind, matched verbatim by the only/except filters.
    pub class_name: String,
    /// Human readable error message.
    pub message: String,
    /// Path of the source file the error was raised from.
    pub source_file: String,
    /// Line in `source_file`.
    pub source_line: u32,
    /// Call stack, innermost frame first.
    pub trace: Vec<Frame>,
}

impl ErrorEvent {
    pub fn new(
        class_name: impl Into<String>,
        message: impl Into<String>,
        source_file: impl Into<String>,
        source_line: u32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            message: message.into(),
            source_file: source_file.into(),
            source_line,
            trace: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Vec<Frame>) -> Self {
        self.trace = trace;
        self
    }

    /// Captures a Rust error at the caller's location.
    ///
    /// The class name is the error's type name as reported by
    /// [`std::any::type_name`] (for example `std::io::error::Error` for
    /// `std::io::Error`) and every `source()` in the cause chain becomes one
    /// frame of the trace. `type_name` output is not guaranteed to be stable
    /// across compiler versions, so filter lists should be checked after a
    /// toolchain upgrade.
    #[track_caller]
    pub fn from_error<E>(err: &E) -> Self
    where
        E: StdError + ?Sized,
    {
        let location = Location::caller();
        let mut trace = Vec::new();
        let mut cause = err.source();
        while let Some(inner) = cause {
            trace.push(Frame::new().with("error", inner));
            cause = inner.source();
        }

        Self::new(
            std::any::type_name::<E>(),
            err.to_string(),
            location.file(),
            location.line(),
        )
        .with_trace(trace)
    }

    /// Builds an event from the pieces a panic hook has at hand.
    pub fn from_panic(
        payload: &(dyn Any + Send),
        location: Option<&Location<'_>>,
        backtrace: &Backtrace,
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Box<dyn Any>".to_string()
        };

        let (file, line) = location
            .map(|l| (l.file().to_string(), l.line()))
            .unwrap_or_else(|| ("<unknown>".to_string(), 0));

        let trace = if backtrace.status() == BacktraceStatus::Captured {
            skip_panic_machinery(frames_from_backtrace(&backtrace.to_string()))
        } else {
            Vec::new()
        };

        Self::new(PANIC_CLASS, message, file, line).with_trace(trace)
    }

    /// An event with no class name is not a usable error value.
    pub fn is_valid(&self) -> bool {
        !self.class_name.trim().is_empty()
    }
}

/// Parses the `Display` rendering of a [`Backtrace`] into frames.
///
/// Each `N: symbol` line opens a frame; a following `at path:line:col` line
/// adds `file` and `line` to it.
pub fn frames_from_backtrace(rendered: &str) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut current: Option<Frame> = None;

    for line in rendered.lines().map(str::trim) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = current.take() {
                current = Some(with_location(frame, location));
            }
            continue;
        }

        let Some((index, symbol)) = line.split_once(": ") else {
            continue;
        };
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if let Some(frame) = current.replace(Frame::new().with("function", symbol)) {
            frames.push(frame);
        }
    }

    frames.extend(current);
    frames
}

/// Symbols belonging to the panic runtime rather than to the panicking code.
const PANIC_MACHINERY: &[&str] = &[
    "std::panicking::",
    "core::panicking::",
    "std::panic::panic_any",
    "core::result::unwrap_failed",
    "core::option::unwrap_failed",
    "core::option::expect_failed",
];

fn is_panic_machinery(frame: &Frame) -> bool {
    frame.get("function").is_some_and(|f| {
        PANIC_MACHINERY.iter().any(|prefix| f.starts_with(prefix))
            || f.contains("rust_begin_unwind")
            || f.contains("__rust_end_short_backtrace")
    })
}

/// Drops the frames of the capture, the hook and the panic runtime.
///
/// A backtrace taken inside a panic hook starts with the hook itself, then
/// the panic runtime, then the code that panicked. Everything up to and
/// including the first run of runtime frames is removed. Without any runtime
/// frame the trace is returned untouched.
pub fn skip_panic_machinery(frames: Vec<Frame>) -> Vec<Frame> {
    let Some(first) = frames.iter().position(is_panic_machinery) else {
        return frames;
    };
    let end = frames[first..]
        .iter()
        .position(|f| !is_panic_machinery(f))
        .map_or(frames.len(), |offset| first + offset);

    frames.into_iter().skip(end).collect()
}

fn with_location(frame: Frame, location: &str) -> Frame {
    // path:line:col, where the path itself may contain ':' on Windows
    let mut parts = location.rsplitn(3, ':');
    let _col = parts.next();
    match (parts.next(), parts.next()) {
        (Some(line), Some(file)) if line.chars().all(|c| c.is_ascii_digit()) => {
            frame.with("file", file).with("line", line)
        }
        _ => frame.with("file", location),
    }
}
