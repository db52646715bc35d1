//! Core logger types and traits

pub mod caller;
pub mod config;
pub mod encoder;
pub mod error;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod pool;
pub mod timestamp;
pub mod value;
pub mod writer;

pub use caller::{Caller, CallerLocator, SiteLocator};
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use log_entry::{Context, Entry, Fields, Joined};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder};
pub use metrics::LoggerMetrics;
pub use pool::PoolStats;
pub use timestamp::TimestampFormat;
pub use value::{MarshalError, MarshalJson, MarshalText, Record, Value};
pub use writer::LogWriter;
