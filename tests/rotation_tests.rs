//! Rotation tests for the rotating file writer
//!
//! These tests verify:
//! - Size rotation at the configured threshold
//! - Lines are never split across segments
//! - Restart behavior with pre-existing segments
//! - Hourly rotation with date patterns
//! - Link maintenance
//! - Rotation failures keep the previous segment in use

use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use pooled_json_logger::core::writer::ENTRY_MARKER;
use pooled_json_logger::prelude::*;
use pooled_json_logger::writers::LinkUpdater;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn marker_line(len: usize) -> Vec<u8> {
    let mut line = ENTRY_MARKER.to_vec();
    line.resize(len - 1, b'.');
    line.push(b'\n');
    line
}

fn segments(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    found.sort();
    found
}

#[test]
fn test_hundred_byte_threshold_with_ten_byte_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pattern = temp_dir.path().join("seg-index.log");
    let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 100).unwrap();

    for _ in 0..10 {
        writer.write(&marker_line(10)).unwrap();
    }
    writer.sync().unwrap();

    let first = fs::read(temp_dir.path().join("seg-0.log")).unwrap();
    assert_eq!(first.len(), 90, "segment 0 holds 9 lines");
    assert_eq!(fs::read(temp_dir.path().join("seg-1.log")).unwrap().len(), 10);
}

#[test]
fn test_logger_lines_never_split() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pattern = temp_dir.path().join("app-index.log");
    let threshold = 512;
    let config = LoggerConfig::new()
        .with_path(pattern.to_str().unwrap())
        .with_max_size(threshold);
    let logger = Logger::new(config).unwrap();
    assert_eq!(logger.writer_name(), "rotating_file");

    for i in 0..200 {
        logger
            .with_field("i", i)
            .with_field("pad", "x".repeat(i % 40))
            .info(format!("line number {}", i));
    }
    logger.sync().unwrap();

    let files = segments(temp_dir.path(), "app-");
    assert!(files.len() > 1, "expected rotation, got {:?}", files);

    let mut seen = 0;
    let mut longest = 0;
    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        assert!(content.is_empty() || content.ends_with('\n'));
        for line in content.lines() {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert!(parsed["message"].as_str().unwrap().starts_with("line number"));
            longest = longest.max(line.len() as u64 + 1);
            seen += 1;
        }
    }
    assert_eq!(seen, 200);

    for file in &files {
        let size = fs::metadata(file).unwrap().len();
        assert!(size <= threshold + longest, "{:?} is {} bytes", file, size);
    }
}

#[test]
fn test_restart_skips_full_segments() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pattern = temp_dir.path().join("app-index.log");
    fs::write(temp_dir.path().join("app-0.log"), vec![b'x'; 200]).unwrap();

    let config = LoggerConfig::new()
        .with_path(pattern.to_str().unwrap())
        .with_max_size(100);
    let logger = Logger::new(config).unwrap();
    logger.info("after restart");
    logger.sync().unwrap();

    assert_eq!(fs::read(temp_dir.path().join("app-0.log")).unwrap().len(), 200);
    let resumed = fs::read_to_string(temp_dir.path().join("app-1.log")).unwrap();
    assert!(resumed.contains("after restart"));
}

#[test]
fn test_continuation_writes_stay_in_segment() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pattern = temp_dir.path().join("raw-index.log");
    let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 20).unwrap();

    writer.write(&marker_line(15)).unwrap();
    // a line written in pieces: only the first piece carries the marker
    writer.write(b"tail of the previous line that is long\n").unwrap();
    assert_eq!(writer.current_path(), Some(temp_dir.path().join("raw-0.log").as_path()));

    writer.write(&marker_line(15)).unwrap();
    assert_eq!(writer.current_path(), Some(temp_dir.path().join("raw-1.log").as_path()));
}

#[test]
fn test_hourly_rotation_with_clock() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let now: Arc<Mutex<DateTime<Local>>> = Arc::new(Mutex::new(
        Local.with_ymd_and_hms(2024, 2, 29, 23, 30, 0).single().unwrap(),
    ));
    let clock = Arc::clone(&now);
    let pattern = temp_dir.path().join("day-yyyyMMdd-HH.log");

    let mut writer = RotatingFileWriter::builder(pattern.to_str().unwrap())
        .clock(Arc::new(move || *clock.lock()))
        .open()
        .unwrap();
    assert_eq!(writer.max_size(), u64::MAX);

    writer.write(&marker_line(20)).unwrap();
    *now.lock() = Local.with_ymd_and_hms(2024, 3, 1, 0, 0, 5).single().unwrap();
    writer.write(&marker_line(20)).unwrap();
    writer.sync().unwrap();

    assert!(temp_dir.path().join("day-20240229-23.log").exists());
    assert_eq!(
        writer.current_path(),
        Some(temp_dir.path().join("day-20240301-00.log").as_path())
    );
}

#[cfg(unix)]
#[test]
fn test_link_tracks_newest_segment() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let link = temp_dir.path().join("current/app.log");
    let config = LoggerConfig::new()
        .with_path(temp_dir.path().join("app-index.log").to_str().unwrap())
        .with_max_size(300)
        .with_link(link.to_str().unwrap());
    let logger = Logger::new(config).unwrap();

    for i in 0..20 {
        logger.with_field("i", i).info("fill the segment");
    }
    logger.sync().unwrap();

    let newest = segments(temp_dir.path(), "app-")
        .into_iter()
        .max_by_key(|p| {
            let name = p.file_stem().unwrap().to_str().unwrap();
            name.trim_start_matches("app-").parse::<u64>().unwrap()
        })
        .unwrap();
    let target = fs::read_link(&link).unwrap();
    assert!(target.is_absolute());
    assert_eq!(target, newest);
    assert_eq!(
        fs::read_to_string(&link).unwrap(),
        fs::read_to_string(&newest).unwrap()
    );
}

#[cfg(unix)]
#[test]
fn test_link_updater_as_callback() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let link = temp_dir.path().join("latest.log");
    let mut writer = RotatingFileWriter::builder(
        temp_dir.path().join("cb-index.log").to_str().unwrap(),
    )
    .max_size(30)
    .on_rotate(LinkUpdater::new(&link).unwrap().into_callback())
    .open()
    .unwrap();

    for _ in 0..3 {
        writer.write(&marker_line(20)).unwrap();
    }
    assert_eq!(fs::read_link(&link).unwrap(), temp_dir.path().join("cb-2.log"));
}

#[test]
fn test_rotation_failure_keeps_previous_segment() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // a directory where the next segment should go cannot be opened as a file
    fs::create_dir(temp_dir.path().join("app-1.log")).unwrap();

    let pattern = temp_dir.path().join("app-index.log");
    let mut writer = RotatingFileWriter::open(pattern.to_str().unwrap(), false, 25).unwrap();
    writer.write(&marker_line(20)).unwrap();

    let result = writer.write(&marker_line(20));
    assert!(matches!(result, Err(LoggerError::FileRotationError { .. })));
    writer.sync().unwrap();

    assert_eq!(fs::read(temp_dir.path().join("app-0.log")).unwrap().len(), 40);
    assert_eq!(writer.current_path(), Some(temp_dir.path().join("app-0.log").as_path()));
}

#[test]
fn test_rotation_failure_is_counted_by_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(temp_dir.path().join("app-1.log")).unwrap();

    let config = LoggerConfig::new()
        .with_path(temp_dir.path().join("app-index.log").to_str().unwrap())
        .with_max_size(100);
    let logger = Logger::new(config).unwrap();
    logger.info("first line is long enough");
    logger.info("second line triggers rotation");
    logger.sync().unwrap();

    assert_eq!(logger.metrics().rotation_errors(), 1);
    assert_eq!(logger.metrics().total_logged(), 2);
    let content = fs::read_to_string(temp_dir.path().join("app-0.log")).unwrap();
    assert_eq!(content.lines().count(), 2);
}
