//! Logger configuration
//!
//! The field names match the configuration keys (`std`, `path`, `maxsize`,
//! `link`, `level`, `timeformat`, `fileline`), so any serde format can decode
//! a `LoggerConfig` directly.

use super::error::Result;
use super::log_level::LogLevel;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Tee every line to standard output
    pub std: bool,
    /// File name pattern. May contain `index` (size rotation) and the date
    /// tokens `yyyy`, `yy`, `MM`, `dd`, `HH`. Empty means stdout only.
    pub path: String,
    /// Segment size threshold in bytes; only used when `path` contains `index`
    pub maxsize: u64,
    /// Symlink refreshed to point at the newest segment
    pub link: String,
    /// Minimum level written
    pub level: LogLevel,
    /// Format of the `time` key
    pub timeformat: TimestampFormat,
    /// Add caller `name`, `file` and `line` fields to every line
    pub fileline: bool,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a configuration from JSON
    ///
    /// # Examples
    ///
    /// ```
    /// use pooled_json_logger::{LoggerConfig, LogLevel};
    ///
    /// let config = LoggerConfig::from_json(r#"{"path":"app-index.log","maxsize":1024,"level":"warn"}"#).unwrap();
    /// assert_eq!(config.level, LogLevel::Warning);
    /// assert_eq!(config.maxsize, 1024);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.timeformat.validate()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_std(mut self, std: bool) -> Self {
        self.std = std;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_size(mut self, maxsize: u64) -> Self {
        self.maxsize = maxsize;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_time_format(mut self, format: impl Into<TimestampFormat>) -> Self {
        self.timeformat = format.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_file_line(mut self, enabled: bool) -> Self {
        self.fileline = enabled;
        self
    }
}
