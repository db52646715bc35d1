//! Timestamp formatting for the `time` key of each line
//!
//! Formats are written straight into the line buffer, so formatting a
//! timestamp does not allocate an intermediate `String`.

use super::error::{LoggerError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Default strftime pattern: `2025-01-08 10:30:45`
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp format options
///
/// In configuration a format is a plain string: one of the names below or any
/// strftime pattern.
///
/// # Examples
///
/// ```
/// use pooled_json_logger::TimestampFormat;
///
/// let named: TimestampFormat = "rfc3339".into();
/// assert_eq!(named, TimestampFormat::Rfc3339);
///
/// let custom: TimestampFormat = "%d/%b/%Y:%H:%M:%S".into();
/// assert_eq!(custom, TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TimestampFormat {
    /// `2025-01-08 10:30:45` in local time
    #[default]
    DateTime,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123+00:00`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456+00:00`
    Iso8601Micros,

    /// RFC 3339: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Any strftime-compatible pattern
    Custom(String),
}

impl TimestampFormat {
    /// Append the formatted `datetime` to `buf`
    pub fn write_to(&self, buf: &mut Vec<u8>, datetime: &DateTime<Local>) {
        // writing into a Vec only fails on a bad strftime pattern, which
        // `validate` rejects up front
        let _ = match self {
            TimestampFormat::DateTime => write!(buf, "{}", datetime.format(DEFAULT_TIME_FORMAT)),
            TimestampFormat::Iso8601 => write!(buf, "{}", datetime.format("%Y-%m-%dT%H:%M:%S%.3f%:z")),
            TimestampFormat::Iso8601Micros => {
                write!(buf, "{}", datetime.format("%Y-%m-%dT%H:%M:%S%.6f%:z"))
            }
            TimestampFormat::Rfc3339 => write!(buf, "{}", datetime.format("%Y-%m-%dT%H:%M:%S%:z")),
            TimestampFormat::Unix => write!(buf, "{}", datetime.timestamp()),
            TimestampFormat::UnixMillis => write!(buf, "{}", datetime.timestamp_millis()),
            TimestampFormat::UnixMicros => write!(buf, "{}", datetime.timestamp_micros()),
            TimestampFormat::Custom(pattern) => write!(buf, "{}", datetime.format(pattern)),
        };
    }

    /// Format into a fresh `String`
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        let mut buf = Vec::with_capacity(32);
        self.write_to(&mut buf, datetime);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Reject strftime patterns chrono cannot render
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(pattern) = self {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LoggerError::config(
                    "timeformat",
                    format!("invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        match self {
            TimestampFormat::DateTime => DEFAULT_TIME_FORMAT,
            TimestampFormat::Iso8601 => "iso8601",
            TimestampFormat::Iso8601Micros => "iso8601_micros",
            TimestampFormat::Rfc3339 => "rfc3339",
            TimestampFormat::Unix => "unix",
            TimestampFormat::UnixMillis => "unix_millis",
            TimestampFormat::UnixMicros => "unix_micros",
            TimestampFormat::Custom(pattern) => pattern,
        }
    }
}

impl From<&str> for TimestampFormat {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "datetime" => TimestampFormat::DateTime,
            "iso8601" => TimestampFormat::Iso8601,
            "iso8601_micros" => TimestampFormat::Iso8601Micros,
            "rfc3339" => TimestampFormat::Rfc3339,
            "unix" => TimestampFormat::Unix,
            "unix_millis" => TimestampFormat::UnixMillis,
            "unix_micros" => TimestampFormat::UnixMicros,
            _ if s == DEFAULT_TIME_FORMAT => TimestampFormat::DateTime,
            _ => TimestampFormat::Custom(s.to_string()),
        }
    }
}

impl From<String> for TimestampFormat {
    fn from(s: String) -> Self {
        TimestampFormat::from(s.as_str())
    }
}

impl From<TimestampFormat> for String {
    fn from(format: TimestampFormat) -> Self {
        format.name().to_string()
    }
}
