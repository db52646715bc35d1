//! File name patterns for rotating writers
//!
//! A pattern such as `/var/log/app-yyyyMMdd-index.log` carries two kinds of
//! placeholder: date tokens, filled from the clock, and the `index` token,
//! filled with the segment number.
//!
//! Placeholders are only recognised in the file name. Directory components are
//! taken literally, so `/srv/addons/app.log` names a plain file.

use chrono::{DateTime, Duration, Local, TimeZone, Timelike};
use std::path::is_separator;

/// Placeholder replaced by the segment number
pub const INDEX_TOKEN: &str = "index";

/// Date tokens in substitution order. Each is replaced at most once.
const DATE_TOKENS: [(&str, &str); 5] = [
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
];

/// Substitute the date tokens of `pattern` with `now`.
///
/// # Examples
///
/// ```
/// use chrono::{Local, TimeZone};
/// use pooled_json_logger::writers::pattern::format_date_name;
///
/// let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 0, 0).unwrap();
/// assert_eq!(format_date_name("logs/app-yyyyMMdd-HH.log", &now), "logs/app-20240309-07.log");
/// ```
pub fn format_date_name(pattern: &str, now: &DateTime<Local>) -> String {
    let (dir, file) = split_file_name(pattern);
    let mut name = file.to_string();
    for (token, strftime) in DATE_TOKENS {
        if let Some(pos) = name.find(token) {
            let value = now.format(strftime).to_string();
            name.replace_range(pos..pos + token.len(), &value);
        }
    }
    format!("{}{}", dir, name)
}

/// Replace every `index` placeholder in the file name with `index`
pub fn substitute_index(name: &str, index: u64) -> String {
    let (dir, file) = split_file_name(name);
    format!("{}{}", dir, file.replace(INDEX_TOKEN, &index.to_string()))
}

pub fn has_index(pattern: &str) -> bool {
    split_file_name(pattern).1.contains(INDEX_TOKEN)
}

/// Whether the file name changes with the date
pub fn has_date_tokens(pattern: &str) -> bool {
    let file = split_file_name(pattern).1;
    DATE_TOKENS.iter().any(|(token, _)| file.contains(token))
}

/// Split after the last path separator: `(directory part, file name)`
fn split_file_name(pattern: &str) -> (&str, &str) {
    let start = pattern.rfind(is_separator).map_or(0, |i| i + 1);
    pattern.split_at(start)
}

/// Start of the hour after `now`
pub fn next_hour(now: &DateTime<Local>) -> DateTime<Local> {
    let naive = now.naive_local();
    let hour_start = naive
        .date()
        .and_hms_opt(naive.hour(), 0, 0)
        .unwrap_or(naive);
    Local
        .from_local_datetime(&(hour_start + Duration::hours(1)))
        .earliest()
        .unwrap_or_else(|| *now + Duration::hours(1))
}
