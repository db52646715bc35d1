//! # Pooled JSON Logger
//!
//! Structured, level-filtered logging that writes one JSON object per line.
//!
//! ## Features
//!
//! - **Low allocation**: entry buffers are pooled and values are encoded
//!   straight into them
//! - **Shared contexts**: accumulate fields once, log from many threads
//! - **Self-rotating files**: size and hourly rotation with a stable symlink
//!   to the newest segment
//!
//! ```
//! use pooled_json_logger::prelude::*;
//!
//! let memory = MemoryWriter::new();
//! let logger = Logger::builder().writer(memory.clone()).build().unwrap();
//!
//! logger.with_field("user", "a").with_field("n", 3).error("failed");
//!
//! let line = &memory.lines()[0];
//! assert!(line.contains(r#""level":"ERROR","fields":{"user":"a","n":3},"message":"failed""#));
//! ```

pub mod core;
pub mod macros;
pub mod writers;

pub mod prelude {
    pub use crate::core::{
        Context, Entry, Fields, Joined, LogLevel, LogWriter, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Record, Result, TimestampFormat, Value,
    };
    pub use crate::writers::{FileWriter, MemoryWriter, RotatingFileWriter, StdoutWriter};
}

pub use self::core::{
    Caller, CallerLocator, Context, Entry, Fields, Joined, LogLevel, LogWriter, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, MarshalError, MarshalJson,
    MarshalText, PoolStats, Record, Result, SiteLocator, TimestampFormat, Value,
};
pub use writers::{open_writer, FileWriter, MemoryWriter, RotatingFileWriter, StdoutWriter};
