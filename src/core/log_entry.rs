//! Entries and contexts
//!
//! A [`Context`] is a shared, never-rendered set of accumulated fields: the
//! logger's root context, or one captured with [`Entry::into_context`]. Every
//! call on a context forks a private [`Entry`] from the pool, so contexts can be
//! used from many threads at once.
//!
//! An [`Entry`] is single-use. Its severity methods consume it, render the line
//! and hand the buffers back to the pool.

use super::caller::CallerCapture;
use super::encoder::{append_escaped, append_escaped_str, append_value, EscapeWriter};
use super::error::LoggerError;
use super::log_level::LogLevel;
use super::logger::Shared;
use super::value::Value;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::panic::Location;
use std::sync::Arc;

/// Fields applied in one call with `with_fields`
pub type Fields = HashMap<String, Value>;

/// Initial capacity of the pooled buffers
const BUFFER_CAPACITY: usize = 2048;

/// Buffers that grew past this are dropped instead of pooled
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Reusable buffers of one entry
#[derive(Debug, Default)]
pub struct EntryState {
    /// `"key":value,` pairs, always ending in `,` when non-empty
    fields: Vec<u8>,
    /// The assembled line
    line: Vec<u8>,
}

impl EntryState {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::with_capacity(BUFFER_CAPACITY),
            line: Vec::with_capacity(BUFFER_CAPACITY),
        }
    }

    fn reset(&mut self) {
        self.fields.clear();
        self.line.clear();
    }

    fn oversized(&self) -> bool {
        self.fields.capacity() > MAX_RETAINED_CAPACITY
            || self.line.capacity() > MAX_RETAINED_CAPACITY
    }
}

/// Append `"key":<value>,`
fn append_field(buf: &mut Vec<u8>, key: &str, value: &Value) {
    buf.push(b'"');
    append_escaped_str(buf, key);
    buf.extend_from_slice(b"\":");
    append_value(buf, value);
    buf.push(b',');
}

/// Space-joined message arguments
///
/// # Examples
///
/// ```
/// use pooled_json_logger::Joined;
///
/// assert_eq!(Joined(&[&"listening on", &8080]).to_string(), "listening on 8080");
/// ```
pub struct Joined<'a>(pub &'a [&'a dyn fmt::Display]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

/// One in-flight log record
pub struct Entry {
    shared: Arc<Shared>,
    state: EntryState,
    threshold: LogLevel,
    time: DateTime<Local>,
    caller: CallerCapture,
}

impl Entry {
    /// Add a field.
    ///
    /// Two keys are handled rather than written:
    ///
    /// - `depth`: an integer adds to the caller depth; `"enable"` or
    ///   `"disable"` switches caller capture on or off.
    /// - `time`: a [`Value::Time`] replaces the entry's timestamp.
    ///
    /// Values of any other kind under these keys are written as ordinary
    /// fields.
    #[must_use = "an entry only logs when a severity method is called"]
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match (key, &value) {
            ("depth", Value::Int(delta)) => self.caller.adjust(*delta),
            ("depth", Value::Str(mode)) => match mode.as_ref() {
                "enable" => self.caller.enabled = true,
                "disable" => self.caller.enabled = false,
                _ => {}
            },
            ("time", Value::Time(time)) => self.time = *time,
            _ => append_field(&mut self.state.fields, key, &value),
        }
        self
    }

    /// Add every field of `fields`
    #[must_use = "an entry only logs when a severity method is called"]
    pub fn with_fields(self, fields: Fields) -> Self {
        fields
            .into_iter()
            .fold(self, |entry, (key, value)| entry.with_field(&key, value))
    }

    /// Freeze the fields gathered so far into a reusable context
    pub fn into_context(self) -> Context {
        Context {
            shared: Arc::clone(&self.shared),
            fields: Arc::from(self.state.fields.as_slice()),
            caller: self.caller,
        }
    }

    /// Threshold captured when the entry was forked
    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    #[track_caller]
    pub fn debug(self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warning(self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    #[track_caller]
    pub fn error(self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    /// Log at `FATAL`. Never filtered by the threshold.
    #[track_caller]
    pub fn fatal(self, message: impl fmt::Display) {
        self.log(LogLevel::Fatal, message);
    }

    /// Log at `level`. Below the threshold nothing is formatted or written.
    #[track_caller]
    pub fn log(mut self, level: LogLevel, message: impl fmt::Display) {
        if !level.passes(self.threshold) {
            self.shared.metrics.record_filtered();
            return;
        }
        self.render(level, &message, Location::caller());
        self.emit();
    }

    /// Assemble the complete line in `state.line`
    pub(crate) fn render(
        &mut self,
        level: LogLevel,
        message: &dyn fmt::Display,
        site: &'static Location<'static>,
    ) {
        if self.caller.enabled {
            let caller = self.shared.locator.locate(self.caller.frames(), site);
            let fields = &mut self.state.fields;
            append_field(fields, "name", &Value::from(caller.name));
            append_field(fields, "file", &Value::from(caller.file));
            append_field(fields, "line", &Value::from(caller.line));
        }

        let EntryState { fields, line } = &mut self.state;
        line.clear();
        line.extend_from_slice(br#"{"time":""#);
        let stamp = line.len();
        self.shared.timeformat.write_to(line, &self.time);
        // custom formats may carry quotes or backslashes
        if line[stamp..].iter().any(|&b| b == b'"' || b == b'\\' || b < 0x20) {
            let raw = line.split_off(stamp);
            append_escaped(line, &raw);
        }
        line.extend_from_slice(br#"","level":""#);
        line.extend_from_slice(level.to_str().as_bytes());

        if let Some((_, pairs)) = fields.split_last() {
            line.extend_from_slice(br#"","fields":{"#);
            line.extend_from_slice(pairs);
            line.push(b'}');
        } else {
            line.push(b'"');
        }

        let start = line.len();
        line.extend_from_slice(br#","message":""#);
        let body = line.len();
        let _ = write!(EscapeWriter(&mut *line), "{}", message);
        if line.len() == body {
            line.truncate(start);
            line.extend_from_slice(b"}\n");
        } else {
            line.extend_from_slice(b"\"}\n");
        }
    }

    /// Hand the rendered line to the writer
    fn emit(&self) {
        let shared = &self.shared;
        let result = shared.writer.lock().write(&self.state.line);
        match result {
            Ok(_) => {
                shared.metrics.record_logged();
            }
            Err(e @ LoggerError::FileRotationError { .. }) => {
                // the line still went to the previous segment
                shared.metrics.record_logged();
                shared.metrics.record_rotation_error();
                eprintln!("[LOGGER ERROR] Failed to rotate log file: {}", e);
            }
            Err(e) => {
                shared.metrics.record_dropped();
                eprintln!("[LOGGER ERROR] Failed to write log entry: {}", e);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn line(&self) -> &[u8] {
        &self.state.line
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        let mut state = std::mem::take(&mut self.state);
        if state.oversized() {
            return;
        }
        state.reset();
        self.shared.pool.release(state);
    }
}

/// Shared template for entries
///
/// Cloning a context is cheap; the accumulated field bytes are shared.
#[derive(Clone)]
pub struct Context {
    shared: Arc<Shared>,
    fields: Arc<[u8]>,
    caller: CallerCapture,
}

impl Context {
    pub(crate) fn root(shared: Arc<Shared>, caller: CallerCapture) -> Self {
        Self {
            shared,
            fields: Arc::from(&[][..]),
            caller,
        }
    }

    /// Start a private entry seeded with this context's fields, caller
    /// settings and the logger's current threshold
    pub fn fork(&self) -> Entry {
        let mut state = self.shared.pool.acquire();
        state.fields.extend_from_slice(&self.fields);
        Entry {
            threshold: self.shared.level(),
            shared: Arc::clone(&self.shared),
            state,
            time: Local::now(),
            caller: self.caller,
        }
    }

    /// Fresh handle on the same fields
    pub fn context(&self) -> Context {
        self.clone()
    }

    #[must_use = "an entry only logs when a severity method is called"]
    pub fn with_field(&self, key: &str, value: impl Into<Value>) -> Entry {
        self.fork().with_field(key, value)
    }

    #[must_use = "an entry only logs when a severity method is called"]
    pub fn with_fields(&self, fields: Fields) -> Entry {
        self.fork().with_fields(fields)
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.fork().log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.fork().log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.fork().log(LogLevel::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.fork().log(LogLevel::Error, message);
    }

    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.fork().log(LogLevel::Fatal, message);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        self.fork().log(level, message);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("fields", &String::from_utf8_lossy(&self.fields))
            .field("caller", &self.caller)
            .finish()
    }
}
