//! File logging example
//!
//! Demonstrates size-rotated segments and the link to the newest one.
//!
//! Run with: cargo run --example file_logging

use pooled_json_logger::prelude::*;
use std::fs;

fn main() -> Result<()> {
    println!("=== Pooled JSON Logger - File Logging Example ===\n");

    let dir = std::env::temp_dir().join("pooled_json_logger_demo");
    let config = LoggerConfig::new()
        .with_path(dir.join("app-yyyyMMdd-index.log").to_string_lossy().into_owned())
        .with_max_size(4 * 1024)
        .with_link(dir.join("app.log").to_string_lossy().into_owned())
        .with_level(LogLevel::Info)
        .with_file_line(true);
    let logger = Logger::new(config)?;

    println!("1. Writing enough lines to roll over a few segments...");
    for i in 0..200 {
        logger
            .with_field("request", i)
            .with_field("path", "/api/orders")
            .with_field("status", if i % 17 == 0 { 500 } else { 200 })
            .info("request handled");
    }
    logger.sync()?;

    println!("\n2. Segments in {}:", dir.display());
    let mut names: Vec<_> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for name in names {
        println!("   {}", name);
    }

    let metrics = logger.metrics();
    println!(
        "\n3. Written: {}, dropped: {}, rotation errors: {}",
        metrics.total_logged(),
        metrics.dropped_count(),
        metrics.rotation_errors()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
