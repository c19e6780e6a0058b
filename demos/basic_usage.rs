//! Basic logger usage example
//!
//! Demonstrates synchronous logging to the console, the dual-mode calls,
//! context pairs and the process prefix.
//!
//! Run with: cargo run --example basic_usage

use rust_structured_logger::prelude::*;
use rust_structured_logger::{info, warn};

fn main() -> Result<()> {
    println!("=== Structured Logger - Basic Usage Example ===\n");

    // Synchronous logger: records are handled on the calling thread
    let logger = Logger::builder()
        .handler(ConsoleHandler::new())
        .min_level(LogLevel::Trace)
        .build()?;

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message", &[]);
    logger.debug("This is a debug message", &[]);
    logger.info("This is an info message", &[]);
    logger.warn("This is a warning message", &[]);
    logger.error("This is an error message", &[]);
    logger.fatal("This is a fatal message", &[]);

    println!("\n2. Printf-style and key/value calls:");
    logger.info("user %s has %d items", &values!["alice", 3]);
    logger.info("checkout", &values!["user", "alice", "total", 9.5]);
    logger.info("odd pair count", &values!["user", "alice", "leftover"]);

    println!("\n3. Macros:");
    info!(logger, "listening on port {}", 8080);
    warn!(logger, "slow request"; "path" => "/api/users", "ms" => 1250);

    println!("\n4. Context pairs:");
    let ctx = Context::background().with_value("request_id", "abc-123");
    logger.log_ctx(&ctx, LogLevel::Info, "handled", &values!["status", 200]);
    {
        let _guard = ctx.with_value("attempt", 2).enter();
        logger.warn("retrying", &[]);
    }

    println!("\n5. Prefix:");
    logger.set_prefix("WORKER-1");
    logger.info("prefixed message", &[]);
    logger.set_prefix("");
    logger.info("prefix cleared", &[]);

    println!("\n6. Changing the minimum level:");
    logger.set_min_level(LogLevel::Warn);
    logger.info("Info message (hidden)", &[]);
    logger.warn("Warning message (visible)", &[]);

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
