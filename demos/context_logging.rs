//! Context logging example
//!
//! Demonstrates sharing accumulated fields across threads with contexts.
//!
//! Run with: cargo run --example context_logging

use pooled_json_logger::prelude::*;
use std::thread;

fn handle(ctx: &Context, worker: usize) {
    for job in 0..3 {
        ctx.with_field("worker", worker)
            .with_field("job", job)
            .info("job finished");
    }
}

fn main() -> Result<()> {
    println!("=== Pooled JSON Logger - Context Logging Example ===\n");

    let logger = Logger::new(LoggerConfig::new().with_time_format("rfc3339"))?;

    // Fields gathered once, reused by every worker
    let ctx = logger
        .with_field("service", "scheduler")
        .with_field("version", "1.4.0")
        .into_context();

    thread::scope(|scope| {
        for worker in 0..4 {
            let ctx = &ctx;
            scope.spawn(move || handle(ctx, worker));
        }
    });

    let mut fields = Fields::new();
    fields.insert("workers".to_string(), Value::from(4));
    fields.insert("queue".to_string(), Value::from("default"));
    ctx.with_fields(fields).info("all workers done");

    let stats = logger.pool_stats();
    println!(
        "\nPool: {} allocated, {} reused ({:.1}% hit rate)",
        stats.allocated(),
        stats.reused(),
        stats.hit_rate()
    );

    logger.sync()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
