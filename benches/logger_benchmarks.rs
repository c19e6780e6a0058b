//! Criterion benchmarks for rust_structured_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_structured_logger::prelude::*;
use rust_structured_logger::{LogCall, RecordFormatter};
use std::io;

fn sink_handler() -> WriterHandler<io::Sink> {
    WriterHandler::new(io::sink()).with_min_level(LogLevel::Trace)
}

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new_sync", |b| {
        b.iter(|| {
            let logger = Logger::new(sink_handler());
            black_box(logger)
        });
    });

    group.bench_function("new_async", |b| {
        b.iter(|| {
            let logger = Logger::builder()
                .handler(sink_handler())
                .async_mode(1000)
                .build()
                .expect("build");
            black_box(logger)
        });
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_sync_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new(sink_handler());
    logger.set_min_level(LogLevel::Trace);

    group.bench_function("info_plain", |b| {
        b.iter(|| {
            logger.info(black_box("Info message"), &[]);
        });
    });

    group.bench_function("info_pairs", |b| {
        let args = values!["user", "alice", "items", 3];
        b.iter(|| {
            logger.info(black_box("checkout"), black_box(&args));
        });
    });

    group.bench_function("info_printf", |b| {
        let args = values!["alice", 3];
        b.iter(|| {
            logger.info(black_box("user %s has %d items"), black_box(&args));
        });
    });

    group.bench_function("with_context", |b| {
        let ctx = Context::background()
            .with_value("request_id", "abc-123")
            .with_value("tenant", "acme");
        b.iter(|| {
            logger.log_ctx(&ctx, LogLevel::Info, black_box("Info message"), &[]);
        });
    });

    group.finish();
}

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .handler(sink_handler())
        .min_level(LogLevel::Trace)
        .queue(QueueCapacity::Unbounded)
        .build()
        .expect("build");
    let receiver = logger.channel().expect("channel");

    group.bench_function("enqueue_and_drain", |b| {
        b.iter(|| {
            logger.info(black_box("Async message"), &[]);
            if let Ok(Some(record)) = receiver.try_recv() {
                logger.dispatch(&record);
            }
        });
    });

    let workers = Logger::builder()
        .handler(sink_handler())
        .min_level(LogLevel::Trace)
        .async_mode(10_000)
        .overflow_policy(OverflowPolicy::DropNewest)
        .dispatch_workers(1)
        .build()
        .expect("build");

    group.bench_function("enqueue_with_worker", |b| {
        b.iter(|| {
            workers.info(black_box("Async message"), &[]);
        });
    });

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let logger = Logger::builder()
        .handler(sink_handler())
        .async_mode(10_000)
        .overflow_policy(OverflowPolicy::DropNewest)
        .dispatch_workers(2)
        .build()
        .expect("build");

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = logger.clone();
                    std::thread::spawn(move || {
                        for _ in 0..100 {
                            logger.info(black_box("Concurrent message"), &[]);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
}

// ============================================================================
// Call Resolution Benchmarks
// ============================================================================

fn bench_call_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("call_resolution");
    group.throughput(Throughput::Elements(1));

    let printf_args = values!["alice", 3, 9.5];
    let pair_args = values!["user", "alice", "items", 3, "total", 9.5];

    group.bench_function("printf", |b| {
        b.iter(|| {
            let parts = LogCall::resolve(black_box("user %s has %d items worth %.2f"), &printf_args)
                .into_parts();
            black_box(parts)
        });
    });

    group.bench_function("pairs", |b| {
        b.iter(|| {
            let parts = LogCall::resolve(black_box("checkout"), &pair_args).into_parts();
            black_box(parts)
        });
    });

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    let ctx = Context::background().with_value("request_id", "abc-123");
    let record = Record::new(LogLevel::Info, "Request processed")
        .with_context(&ctx)
        .with_attributes(vec![
            Attribute::int("status", 200),
            Attribute::group(
                "http",
                [
                    Attribute::string("method", "GET"),
                    Attribute::string("path", "/api/users"),
                ],
            ),
        ]);

    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Logfmt] {
        let formatter = RecordFormatter::new(format);
        group.bench_function(format!("{:?}", format).to_lowercase(), |b| {
            b.iter(|| black_box(formatter.format(black_box(&record))));
        });
    }

    group.finish();
}

// ============================================================================
// Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::new(sink_handler());
    logger.set_min_level(LogLevel::Warn);

    group.bench_function("below_threshold", |b| {
        let args = values!["user", "alice"];
        b.iter(|| {
            logger.debug(black_box("This should be filtered"), &args);
        });
    });

    group.bench_function("below_threshold_macro", |b| {
        b.iter(|| {
            rust_structured_logger::debug!(logger, "filtered {}", black_box(42));
        });
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| {
            logger.error(black_box("This should be logged"), &[]);
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_logger_creation,
    bench_sync_logging,
    bench_async_logging,
    bench_concurrent_logging,
    bench_call_resolution,
    bench_formatting,
    bench_level_filtering
);

criterion_main!(benches);
