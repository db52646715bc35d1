//! Self-rotating file writer
//!
//! Segments are named from a pattern (see [`pattern`](super::pattern)). A new
//! segment is opened when
//!
//! - a line starting with [`ENTRY_MARKER`] would take a non-empty segment to
//!   the size threshold, or
//! - the hour rolls over and the date part of the name no longer matches the
//!   open segment.
//!
//! Size rotation only ever happens in front of a complete line, so a line is
//! never split across two segments.

use super::pattern::{format_date_name, has_index, next_hour, substitute_index};
use crate::core::error::{LoggerError, Result};
use crate::core::writer::{LogWriter, ENTRY_MARKER};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Called with the path of every newly opened segment
pub type RotateCallback = Box<dyn FnMut(&Path) + Send>;

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Builder for [`RotatingFileWriter`]
///
/// # Examples
///
/// ```no_run
/// use pooled_json_logger::writers::RotatingFileWriter;
///
/// let writer = RotatingFileWriter::builder("/var/log/app-yyyyMMdd-index.log")
///     .max_size(64 * 1024 * 1024)
///     .open()
///     .unwrap();
/// ```
pub struct RotatingFileWriterBuilder {
    pattern: String,
    std: bool,
    max_size: u64,
    callbacks: Vec<RotateCallback>,
    clock: Clock,
}

impl RotatingFileWriterBuilder {
    /// Also copy every write to standard output
    #[must_use = "builder methods return a new value"]
    pub fn std(mut self, std: bool) -> Self {
        self.std = std;
        self
    }

    /// Segment size threshold. Ignored unless the pattern contains `index`;
    /// zero means no size limit.
    #[must_use = "builder methods return a new value"]
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_rotate(mut self, callback: RotateCallback) -> Self {
        self.callbacks.push(callback);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Open the first segment
    ///
    /// # Errors
    ///
    /// Returns error if the pattern is empty or the segment cannot be opened
    pub fn open(self) -> Result<RotatingFileWriter> {
        if self.pattern.trim().is_empty() {
            return Err(LoggerError::config("RotatingFileWriter", "empty file name pattern"));
        }
        let indexed = has_index(&self.pattern);
        let max_size = match self.max_size {
            n if indexed && n > 0 => n,
            _ => u64::MAX,
        };
        let now = (self.clock)();

        let mut writer = RotatingFileWriter {
            pattern: self.pattern,
            std: self.std,
            indexed,
            max_size,
            next_index: 0,
            next_rotation: next_hour(&now),
            current_size: 0,
            current_path: None,
            writer: None,
            callbacks: self.callbacks,
            clock: self.clock,
        };
        writer.rotate()?;
        Ok(writer)
    }
}

pub struct RotatingFileWriter {
    pattern: String,
    std: bool,
    indexed: bool,
    max_size: u64,
    next_index: u64,
    next_rotation: DateTime<Local>,
    current_size: u64,
    current_path: Option<PathBuf>,
    writer: Option<BufWriter<File>>,
    callbacks: Vec<RotateCallback>,
    clock: Clock,
}

impl RotatingFileWriter {
    pub fn builder(pattern: impl Into<String>) -> RotatingFileWriterBuilder {
        RotatingFileWriterBuilder {
            pattern: pattern.into(),
            std: false,
            max_size: 0,
            callbacks: Vec::new(),
            clock: Arc::new(Local::now),
        }
    }

    /// Open a rotating writer with the default clock and no callbacks
    pub fn open(pattern: impl Into<String>, std: bool, max_size: u64) -> Result<Self> {
        Self::builder(pattern).std(std).max_size(max_size).open()
    }

    /// Bytes in the current segment, including those it held when opened
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Path of the open segment
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Effective size threshold (`u64::MAX` when size rotation is off)
    #[must_use]
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Index the next size rotation will try first
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Open the next segment whose existing size is still below the threshold.
    ///
    /// The previous segment is only flushed and closed once the new one is
    /// open, so a failure leaves the writer on its old file.
    fn rotate(&mut self) -> Result<()> {
        let now = (self.clock)();
        let name = format_date_name(&self.pattern, &now);

        loop {
            let candidate = PathBuf::from(substitute_index(&name, self.next_index));
            if let Some(parent) = candidate.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::file_rotation(
                        candidate.display().to_string(),
                        format!("Failed to create directory '{}': {}", parent.display(), e),
                    )
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&candidate)
                .map_err(|e| {
                    LoggerError::file_rotation(
                        candidate.display().to_string(),
                        format!("Failed to open segment: {}", e),
                    )
                })?;
            self.next_index += 1;

            let existing = file.metadata().map(|m| m.len()).unwrap_or(0);
            // without an index every candidate is the same file
            if existing >= self.max_size && self.indexed {
                continue;
            }

            if let Some(mut old) = self.writer.take() {
                if let Err(e) = old.flush().and_then(|_| old.get_ref().sync_all()) {
                    eprintln!("[LOGGER ERROR] Failed to flush segment before rotation: {}", e);
                }
            }
            self.writer = Some(BufWriter::new(file));
            self.current_size = existing;
            for callback in &mut self.callbacks {
                callback(&candidate);
            }
            self.current_path = Some(candidate);
            return Ok(());
        }
    }

    /// Hour rollover: once past the scheduled instant, rotate if the date part
    /// of the name moved on.
    fn check_time(&mut self) -> Result<()> {
        let now = (self.clock)();
        if now <= self.next_rotation {
            return Ok(());
        }
        self.next_rotation = next_hour(&now);

        let expected = substitute_index(
            &format_date_name(&self.pattern, &now),
            self.next_index.saturating_sub(1),
        );
        if self.current_path.as_deref() != Some(Path::new(&expected)) {
            self.next_index = 0;
            self.rotate()?;
        }
        Ok(())
    }
}

impl LogWriter for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let len = buf.len() as u64;
        let mut rotation = Ok(());

        // a fresh segment always takes its first line, however long
        if buf.starts_with(ENTRY_MARKER)
            && self.current_size > 0
            && self.current_size.saturating_add(len) >= self.max_size
        {
            rotation = self.rotate();
        }
        let timed = self.check_time();
        if rotation.is_ok() {
            rotation = timed;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::file_writer(self.pattern.as_str(), "no open segment"))?;
        writer.write_all(buf).map_err(|e| {
            LoggerError::file_writer(
                self.current_path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                format!("Failed to write log line: {}", e),
            )
        })?;
        if self.std {
            let _ = io::stdout().lock().write_all(buf);
        }
        self.current_size += len;

        // a failed rotation still lands the line in the previous segment
        rotation.map(|_| buf.len())
    }

    fn sync(&mut self) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        writer.flush()?;
        writer.get_ref().sync_all()?;
        if self.std {
            io::stdout().flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use tempfile::tempdir;

    fn line(len: usize) -> Vec<u8> {
        let mut line = ENTRY_MARKER.to_vec();
        line.resize(len - 1, b'x');
        line.push(b'\n');
        line
    }

    fn fixed_clock(at: Arc<Mutex<DateTime<Local>>>) -> Clock {
        Arc::new(move || *at.lock())
    }

    #[test]
    fn test_size_rotation_at_threshold() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("app-index.log");
        let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 100).unwrap();

        for _ in 0..10 {
            writer.write(&line(10)).unwrap();
        }
        writer.sync().unwrap();

        let first = fs::read(dir.path().join("app-0.log")).unwrap();
        let second = fs::read(dir.path().join("app-1.log")).unwrap();
        assert_eq!(first.len(), 90);
        assert_eq!(second.len(), 10);
        assert_eq!(writer.current_path(), Some(dir.path().join("app-1.log").as_path()));
    }

    #[test]
    fn test_non_marker_writes_never_rotate() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("raw-index.log");
        let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 10).unwrap();

        writer.write(b"continuation bytes without a marker\n").unwrap();
        writer.write(b"more\n").unwrap();
        writer.sync().unwrap();

        assert!(!dir.path().join("raw-1.log").exists());
        assert_eq!(writer.current_size(), 41);
    }

    #[test]
    fn test_full_segments_are_skipped_on_open() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("app-0.log"), vec![b'x'; 100]).unwrap();
        fs::write(dir.path().join("app-1.log"), vec![b'x'; 150]).unwrap();
        fs::write(dir.path().join("app-2.log"), vec![b'x'; 40]).unwrap();

        let pattern = dir.path().join("app-index.log");
        let writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 100).unwrap();

        assert_eq!(writer.current_path(), Some(dir.path().join("app-2.log").as_path()));
        assert_eq!(writer.current_size(), 40);
        assert_eq!(writer.next_index(), 3);
    }

    #[test]
    fn test_pattern_without_index_ignores_max_size() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("app-yyyy.log");
        let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 10).unwrap();
        assert_eq!(writer.max_size(), u64::MAX);

        for _ in 0..5 {
            writer.write(&line(20)).unwrap();
        }
        writer.sync().unwrap();
        assert_eq!(writer.current_size(), 100);
    }

    #[test]
    fn test_hour_rollover_opens_new_segment() {
        let dir = tempdir().unwrap();
        let now = Arc::new(Mutex::new(
            Local.with_ymd_and_hms(2024, 5, 1, 10, 59, 0).single().unwrap(),
        ));
        let pattern = dir.path().join("app-yyyyMMddHH-index.log");
        let mut writer = RotatingFileWriter::builder(pattern.to_str().unwrap())
            .max_size(1 << 20)
            .clock(fixed_clock(Arc::clone(&now)))
            .open()
            .unwrap();

        writer.write(&line(30)).unwrap();
        *now.lock() = Local.with_ymd_and_hms(2024, 5, 1, 11, 0, 1).single().unwrap();
        writer.write(&line(30)).unwrap();
        writer.sync().unwrap();

        assert_eq!(fs::read(dir.path().join("app-2024050110-0.log")).unwrap().len(), 30);
        assert_eq!(fs::read(dir.path().join("app-2024050111-0.log")).unwrap().len(), 30);
    }

    #[test]
    fn test_hour_passing_without_name_change_keeps_segment() {
        let dir = tempdir().unwrap();
        let now = Arc::new(Mutex::new(
            Local.with_ymd_and_hms(2024, 5, 1, 10, 59, 0).single().unwrap(),
        ));
        let pattern = dir.path().join("app-yyyyMMdd-index.log");
        let mut writer = RotatingFileWriter::builder(pattern.to_str().unwrap())
            .max_size(1 << 20)
            .clock(fixed_clock(Arc::clone(&now)))
            .open()
            .unwrap();

        writer.write(&line(30)).unwrap();
        *now.lock() = Local.with_ymd_and_hms(2024, 5, 1, 11, 30, 0).single().unwrap();
        writer.write(&line(30)).unwrap();

        assert_eq!(
            writer.current_path(),
            Some(dir.path().join("app-20240501-0.log").as_path())
        );
        assert_eq!(writer.current_size(), 60);
    }

    #[test]
    fn test_callbacks_see_every_segment() {
        let dir = tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pattern = dir.path().join("cb-index.log");

        let mut writer = RotatingFileWriter::builder(pattern.to_str().unwrap())
            .max_size(60)
            .on_rotate(Box::new(move |path: &Path| sink.lock().push(path.to_path_buf())))
            .open()
            .unwrap();
        for _ in 0..6 {
            writer.write(&line(25)).unwrap();
        }

        // two 25-byte lines per segment
        let seen = seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], dir.path().join("cb-0.log"));
        assert_eq!(seen[2], dir.path().join("cb-2.log"));
    }

    #[test]
    fn test_oversized_lines_fill_fresh_segments() {
        let dir = tempdir().unwrap();
        let pattern = dir.path().join("big-index.log");
        let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 100).unwrap();

        writer.write(&line(150)).unwrap();
        writer.write(&line(100)).unwrap();
        writer.write(&line(10)).unwrap();
        writer.sync().unwrap();

        assert_eq!(fs::read(dir.path().join("big-0.log")).unwrap().len(), 150);
        assert_eq!(fs::read(dir.path().join("big-1.log")).unwrap().len(), 100);
        assert_eq!(fs::read(dir.path().join("big-2.log")).unwrap().len(), 10);
        assert!(!dir.path().join("big-3.log").exists());
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        assert!(RotatingFileWriter::open("  ", false, 10).is_err());
    }
}
