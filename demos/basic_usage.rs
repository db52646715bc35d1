//! Basic logger usage example
//!
//! Demonstrates logging to stdout at different levels, with fields.
//!
//! Run with: cargo run --example basic_usage

use pooled_json_logger::prelude::*;
use pooled_json_logger::{info, warning};

fn main() -> Result<()> {
    println!("=== Pooled JSON Logger - Basic Usage Example ===\n");

    // An empty path writes to stdout
    let logger = Logger::new(LoggerConfig::new().with_level(LogLevel::Debug))?;

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Raising the threshold to WARNING:");
    logger.set_level(LogLevel::Warning);
    logger.debug("Debug message (hidden)");
    logger.info("Info message (hidden)");
    logger.warning("Warning message (visible)");
    logger.fatal("Fatal messages are never filtered");
    logger.set_level(LogLevel::Debug);

    println!("\n3. Fields and message forms:");
    logger
        .with_field("user", "alice")
        .with_field("attempt", 3)
        .with_field("roles", vec!["admin", "ops"])
        .warning("login failed");
    info!(logger, "listening on {}:{}", "0.0.0.0", 8080);
    warning!(logger; "disk usage", 93, "percent");

    println!("\n4. Caller location on demand:");
    logger.with_field("depth", "enable").info("where was this logged?");

    logger.sync()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
