//! Main logger implementation

use super::{
    caller::{CallerCapture, CallerLocator, SiteLocator},
    config::LoggerConfig,
    error::Result,
    log_entry::{Context, Entry, EntryState, Fields},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    pool::{Pool, PoolStats, DEFAULT_POOL_CAPACITY},
    timestamp::TimestampFormat,
    value::Value,
    writer::LogWriter,
};
use crate::writers::open_writer;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// State shared by a logger, its clones, and every context and entry forked
/// from it
pub(crate) struct Shared {
    pub(crate) level: AtomicU8,
    /// Serializes writes, rotation and sync
    pub(crate) writer: Mutex<Box<dyn LogWriter>>,
    pub(crate) pool: Pool<EntryState>,
    pub(crate) locator: Arc<dyn CallerLocator>,
    pub(crate) timeformat: TimestampFormat,
    pub(crate) metrics: LoggerMetrics,
}

impl Shared {
    #[inline]
    pub(crate) fn level(&self) -> LogLevel {
        LogLevel::from_index(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Err(e) = self.writer.get_mut().sync() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped lines (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// Structured JSON logger
///
/// Cloning is cheap and every clone writes through the same writer. The
/// writer is flushed when the last clone, context and entry are gone.
///
/// # Example
///
/// ```no_run
/// use pooled_json_logger::{Logger, LoggerConfig, LogLevel};
///
/// let config = LoggerConfig::new()
///     .with_path("/var/log/app-yyyyMMdd-index.log")
///     .with_max_size(64 << 20)
///     .with_link("/var/log/app.log")
///     .with_level(LogLevel::Info);
/// let logger = Logger::new(config).unwrap();
///
/// logger.with_field("user", "alice").with_field("attempt", 3).warning("login failed");
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    root: Context,
    config: Arc<LoggerConfig>,
}

impl Logger {
    /// Build a logger writing where `config` says
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the output cannot be
    /// opened
    pub fn new(config: LoggerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Change the threshold for entries forked from now on
    pub fn set_level(&self, level: LogLevel) {
        self.shared.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> LogLevel {
        self.shared.level()
    }

    /// Flush the writer
    pub fn sync(&self) -> Result<()> {
        self.shared.writer.lock().sync()
    }

    /// Get logger metrics for monitoring
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Entry pool counters
    pub fn pool_stats(&self) -> &PoolStats {
        self.shared.pool.stats()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Name of the writer in use (`stdout`, `file`, `rotating_file`, ...)
    pub fn writer_name(&self) -> String {
        self.shared.writer.lock().name().to_string()
    }

    /// Clean context with no fields
    pub fn context(&self) -> Context {
        self.root.clone()
    }

    #[must_use = "an entry only logs when a severity method is called"]
    pub fn with_field(&self, key: &str, value: impl Into<Value>) -> Entry {
        self.root.with_field(key, value)
    }

    #[must_use = "an entry only logs when a severity method is called"]
    pub fn with_fields(&self, fields: Fields) -> Entry {
        self.root.with_fields(fields)
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.root.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.root.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.root.log(LogLevel::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.root.log(LogLevel::Error, message);
    }

    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.root.log(LogLevel::Fatal, message);
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        self.root.log(level, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("config", &self.config)
            .field("pool", &self.shared.pool)
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use pooled_json_logger::prelude::*;
///
/// let memory = MemoryWriter::new();
/// let logger = Logger::builder()
///     .level(LogLevel::Info)
///     .time_format(TimestampFormat::Rfc3339)
///     .writer(memory.clone())
///     .build()
///     .unwrap();
///
/// logger.debug("filtered");
/// logger.info("kept");
/// assert_eq!(memory.lines().len(), 1);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    writer: Option<Box<dyn LogWriter>>,
    locator: Arc<dyn CallerLocator>,
    pool_capacity: usize,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            writer: None,
            locator: Arc::new(SiteLocator),
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_format(mut self, format: impl Into<TimestampFormat>) -> Self {
        self.config.timeformat = format.into();
        self
    }

    /// Add caller `name`, `file` and `line` fields to every line
    #[must_use = "builder methods return a new value"]
    pub fn file_line(mut self, enabled: bool) -> Self {
        self.config.fileline = enabled;
        self
    }

    /// Write to `writer` instead of the output described by `std` and `path`
    #[must_use = "builder methods return a new value"]
    pub fn writer<W: LogWriter + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Resolve caller locations with `locator`
    #[must_use = "builder methods return a new value"]
    pub fn locator<L: CallerLocator + 'static>(mut self, locator: L) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    /// Number of idle entries kept for reuse
    #[must_use = "builder methods return a new value"]
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Build the Logger
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the output cannot be
    /// opened
    pub fn build(self) -> Result<Logger> {
        self.config.validate()?;
        let writer = match self.writer {
            Some(writer) => writer,
            None => open_writer(&self.config)?,
        };

        let shared = Arc::new(Shared {
            level: AtomicU8::new(self.config.level as u8),
            writer: Mutex::new(writer),
            pool: Pool::new(self.pool_capacity, EntryState::new),
            locator: self.locator,
            timeformat: self.config.timeformat.clone(),
            metrics: LoggerMetrics::new(),
        });
        let root = Context::root(Arc::clone(&shared), CallerCapture::new(self.config.fileline));

        Ok(Logger {
            shared,
            root,
            config: Arc::new(self.config),
        })
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
