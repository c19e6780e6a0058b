//! Channel drain example
//!
//! Records are queued on a bounded channel and drained by a consumer thread
//! that hands them to a fanout of console and file output.
//!
//! Run with: cargo run --example channel_drain

use rust_structured_logger::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Structured Logger - Channel Drain Example ===\n");

    let path = std::env::temp_dir().join("structured_logger_demo.jsonl");

    let logger = Logger::builder()
        .handler(ConsoleHandler::new().with_min_level(LogLevel::Info))
        .handler(
            WriterHandler::file(&path)?
                .with_output_format(OutputFormat::Json)
                .with_min_level(LogLevel::Debug),
        )
        .min_level(LogLevel::Debug)
        .async_mode(1024)
        .overflow_policy(OverflowPolicy::Block)
        .build()?;

    let receiver = logger
        .channel()
        .ok_or_else(|| LoggerError::Other("logger has no delivery channel".into()))?;
    let drain = {
        let logger = logger.clone();
        thread::spawn(move || {
            let mut drained = 0usize;
            for record in receiver.iter() {
                logger.dispatch(&record);
                drained += 1;
            }
            drained
        })
    };

    let producers: Vec<_> = (0..4)
        .map(|worker| {
            let logger = logger.with_attrs([Attribute::int("worker", worker)]);
            thread::spawn(move || {
                for job in 0..5 {
                    logger.debug("job started", &values!["job", job]);
                    thread::sleep(Duration::from_millis(2));
                    logger.info("job %d finished in %dms", &values![job, 2]);
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().expect("producer thread");
    }

    // Closing ends the consumer's iterator once the queue is empty
    logger.close();
    let drained = drain.join().expect("drain thread");
    logger.flush()?;

    let metrics = logger.metrics();
    println!("\nDrained {} records", drained);
    println!("Enqueued: {}", metrics.enqueued_count());
    println!("Delivered: {}", metrics.delivered_count());
    println!("Dropped: {}", metrics.dropped_count());
    println!("JSON lines written to {}", path.display());

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
