//! Logging macros
//!
//! Every macro takes a target first: a [`Logger`](crate::Logger), a
//! [`Context`](crate::Context) or an [`Entry`](crate::Entry). What follows
//! picks the message form:
//!
//! - `info!(target, "format {}", x)` formats like `format!`.
//! - `info!(target; a, b, c)` joins the `Display` output of each argument
//!   with single spaces.
//!
//! # Examples
//!
//! ```
//! use pooled_json_logger::prelude::*;
//! use pooled_json_logger::info;
//!
//! let memory = MemoryWriter::new();
//! let logger = Logger::builder().writer(memory.clone()).build().unwrap();
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! info!(logger; "hello", "world");
//! info!(logger.with_field("port", port), "ready");
//!
//! let lines = memory.lines();
//! assert!(lines[0].ends_with(r#""message":"Server listening on port 8080"}"#));
//! assert!(lines[1].ends_with(r#""message":"hello world"}"#));
//! ```

/// Log at an explicit level.
///
/// ```
/// # use pooled_json_logger::prelude::*;
/// # let logger = Logger::builder().writer(MemoryWriter::new()).build().unwrap();
/// use pooled_json_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warning; "disk", 93, "%");
/// ```
#[macro_export]
macro_rules! log {
    ($target:expr, $level:expr; $($arg:expr),* $(,)?) => {
        $target.log($level, $crate::Joined(&[$(&$arg as &dyn ::std::fmt::Display),*]))
    };
    ($target:expr, $level:expr, $($arg:tt)+) => {
        $target.log($level, ::std::format_args!($($arg)+))
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($target:expr; $($arg:expr),* $(,)?) => {
        $crate::log!($target, $crate::LogLevel::Debug; $($arg),*)
    };
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($target:expr; $($arg:expr),* $(,)?) => {
        $crate::log!($target, $crate::LogLevel::Info; $($arg),*)
    };
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// ```
/// # use pooled_json_logger::prelude::*;
/// # let logger = Logger::builder().writer(MemoryWriter::new()).build().unwrap();
/// use pooled_json_logger::warning;
/// warning!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warning {
    ($target:expr; $($arg:expr),* $(,)?) => {
        $crate::log!($target, $crate::LogLevel::Warning; $($arg),*)
    };
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($target:expr; $($arg:expr),* $(,)?) => {
        $crate::log!($target, $crate::LogLevel::Error; $($arg),*)
    };
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. Fatal lines are never filtered.
#[macro_export]
macro_rules! fatal {
    ($target:expr; $($arg:expr),* $(,)?) => {
        $crate::log!($target, $crate::LogLevel::Fatal; $($arg),*)
    };
    ($target:expr, $($arg:tt)+) => {
        $crate::log!($target, $crate::LogLevel::Fatal, $($arg)+)
    };
}
