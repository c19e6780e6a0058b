//! Integration tests for rust_structured_logger
//!
//! These tests verify end-to-end behavior of the logging system, including:
//! - Level gating before any record is built
//! - Fan-out delivery and per-sink failure isolation
//! - Context propagation and prefix rendering
//! - Channel delivery: FIFO, manual drain, close-then-drain
//! - File output in every format

use rust_structured_logger::prelude::*;
use rust_structured_logger::{info, values, LogCall, EXTRA_KEY};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn memory_logger(level: LogLevel) -> (Logger, MemoryHandler) {
    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .min_level(level)
        .handler(memory.clone())
        .build()
        .expect("valid logger");
    (logger, memory)
}

fn drain(logger: &Logger, receiver: &RecordReceiver) {
    while let Ok(Some(record)) = receiver.try_recv() {
        logger.dispatch(&record);
    }
}

/// Counts how often it is rendered
struct FormatProbe(Arc<AtomicUsize>);

impl fmt::Display for FormatProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fetch_add(1, Ordering::SeqCst);
        write!(f, "probe")
    }
}

/// Counts every call the pipeline makes into it
#[derive(Default)]
struct CountingHandler {
    threshold: Option<LogLevel>,
    enabled_calls: AtomicUsize,
    handled: AtomicUsize,
}

impl Handler for CountingHandler {
    fn enabled(&self, _ctx: &Context, level: LogLevel) -> bool {
        self.enabled_calls.fetch_add(1, Ordering::SeqCst);
        self.threshold.map_or(true, |t| level >= t)
    }

    fn handle(&self, _ctx: &Context, _record: &Record) -> Result<()> {
        self.handled.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

// ============================================================================
// Level gate
// ============================================================================

#[test]
fn test_threshold_enabled_for_every_level_pair() {
    let ctx = Context::background();
    for (i, low) in LogLevel::ALL.iter().enumerate() {
        for high in &LogLevel::ALL[i + 1..] {
            let handler = MemoryHandler::new().with_min_level(*high);
            assert!(!handler.enabled(&ctx, *low), "{} should be below {}", low, high);
            assert!(handler.enabled(&ctx, *high));
        }
    }
}

#[test]
fn test_disabled_level_never_formats_or_builds() {
    let counting = Arc::new(CountingHandler {
        threshold: Some(LogLevel::Warn),
        ..Default::default()
    });
    let logger = Logger::builder()
        .min_level(LogLevel::Trace)
        .shared_handler(counting.clone())
        .queue(QueueCapacity::Bounded(8))
        .build()
        .expect("build");

    let renders = Arc::new(AtomicUsize::new(0));
    logger.log_args(LogLevel::Debug, format_args!("{}", FormatProbe(renders.clone())));
    info!(logger, "value {}", FormatProbe(renders.clone()));

    assert_eq!(renders.load(Ordering::SeqCst), 0);
    assert_eq!(logger.queue_len(), 0);
    assert_eq!(logger.metrics().enqueued_count(), 0);
    assert_eq!(counting.enabled_calls.load(Ordering::SeqCst), 2);

    logger.log_args(LogLevel::Error, format_args!("{}", FormatProbe(renders.clone())));
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(logger.queue_len(), 1);
}

#[test]
fn test_state_level_gate_applies_before_handler() {
    let counting = Arc::new(CountingHandler::default());
    let logger = Logger::builder()
        .min_level(LogLevel::Error)
        .shared_handler(counting.clone())
        .build()
        .expect("build");

    logger.info("ignored", &[]);
    assert_eq!(counting.enabled_calls.load(Ordering::SeqCst), 0);
    assert_eq!(counting.handled.load(Ordering::SeqCst), 0);

    logger.set_min_level(LogLevel::Info);
    logger.info("kept", &[]);
    assert_eq!(counting.handled.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Fanout
// ============================================================================

#[test]
fn test_fanout_routes_by_member_level() {
    let errors = MemoryHandler::new().with_min_level(LogLevel::Error);
    let all = MemoryHandler::new();
    let logger = Logger::builder()
        .min_level(LogLevel::Trace)
        .handler(Fanout::default().with(errors.clone()).with(all.clone()))
        .build()
        .expect("build");

    logger.debug("debug", &[]);
    logger.error("error", &[]);

    assert_eq!(errors.messages(), vec!["error"]);
    assert_eq!(all.messages(), vec!["debug", "error"]);
}

#[test]
fn test_fanout_failure_reported_not_propagated() {
    struct Broken;
    impl Handler for Broken {
        fn enabled(&self, _ctx: &Context, _level: LogLevel) -> bool {
            true
        }
        fn handle(&self, _ctx: &Context, _record: &Record) -> Result<()> {
            Err(LoggerError::writer("connection reset"))
        }
        fn name(&self) -> &str {
            "broken"
        }
    }

    let reported = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let reported_clone = Arc::clone(&reported);
    let healthy = MemoryHandler::new();
    let logger = Logger::builder()
        .handler(Broken)
        .handler(healthy.clone())
        .on_error(Arc::new(move |e: &LoggerError| reported_clone.lock().push(e.to_string())))
        .build()
        .expect("build");

    logger.warn("still delivered", &[]);

    assert_eq!(healthy.messages(), vec!["still delivered"]);
    assert_eq!(
        reported.lock().as_slice(),
        ["Handler 'broken' failed: Writer error: connection reset"]
    );
    assert_eq!(logger.metrics().handler_errors(), 1);
}

#[test]
fn test_panicking_handler_does_not_reach_caller() {
    struct Panics;
    impl Handler for Panics {
        fn enabled(&self, _ctx: &Context, _level: LogLevel) -> bool {
            true
        }
        fn handle(&self, _ctx: &Context, _record: &Record) -> Result<()> {
            panic!("sink bug");
        }
        fn name(&self) -> &str {
            "panics"
        }
    }

    let logger = Logger::builder()
        .handler(Panics)
        .on_error(Arc::new(|_e: &LoggerError| {}))
        .build()
        .expect("build");

    logger.error("survives", &[]);
    assert_eq!(logger.metrics().handler_errors(), 1);
}

// ============================================================================
// Context and prefix
// ============================================================================

#[test]
fn test_context_override_and_parent_isolation() {
    let (logger, memory) = memory_logger(LogLevel::Info);

    let ctx1 = Context::background().with_value("service", "api");
    let ctx2 = ctx1.with_value("k", "v1");
    let ctx3 = ctx2.with_value("k", "v2");
    let sibling = ctx1.with_value("other", 1);

    logger.log_ctx(&ctx3, LogLevel::Info, "leaf", &[]);
    logger.log_ctx(&ctx1, LogLevel::Info, "root", &[]);
    logger.log_ctx(&sibling, LogLevel::Info, "sibling", &[]);

    let records = memory.records();
    assert_eq!(records[0].attribute("k").map(|a| &a.value), Some(&Value::from("v2")));
    assert!(records[1].attribute("k").is_none());
    assert!(records[2].attribute("k").is_none());
    assert!(records[2].attribute("other").is_some());
}

#[test]
fn test_ambient_context_follows_guard() {
    let (logger, memory) = memory_logger(LogLevel::Info);
    let ctx = Context::background().with_value("trace_id", "t-1");

    {
        let _outer = ctx.enter();
        logger.info("outer", &[]);
        {
            let _inner = ctx.with_value("span", "db").enter();
            logger.info("inner", &[]);
        }
        logger.info("outer again", &[]);
    }
    logger.info("outside", &[]);

    let contexts: Vec<usize> = memory.records().iter().map(|r| r.context.len()).collect();
    assert_eq!(contexts, vec![1, 2, 1, 0]);
}

#[test]
fn test_prefix_until_cleared() {
    let state = Arc::new(LogState::new());
    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .state(Arc::clone(&state))
        .handler(memory.clone())
        .build()
        .expect("build");

    logger.info("before", &[]);
    state.set_prefix("USER");
    logger.info("one", &[]);
    logger.info("two", &[]);
    state.set_prefix("");
    logger.info("after", &[]);

    assert_eq!(
        memory.messages(),
        vec!["before", "[USER] one", "[USER] two", "after"]
    );
}

// ============================================================================
// Dual-mode calls
// ============================================================================

#[test]
fn test_structured_call_pairs_attributes() {
    let (logger, memory) = memory_logger(LogLevel::Info);
    logger.info("msg", &values!["k1", "v1"]);

    let record = &memory.records()[0];
    assert_eq!(record.message, "msg");
    assert_eq!(record.attributes, vec![Attribute::string("k1", "v1")]);
}

#[test]
fn test_printf_call_formats_without_attributes() {
    let (logger, memory) = memory_logger(LogLevel::Info);
    logger.infof("msg %s", &values!["x"]);

    let record = &memory.records()[0];
    assert_eq!(record.message, "msg x");
    assert!(record.attributes.is_empty());
}

#[test]
fn test_verb_count_mismatch_falls_back_to_pairs() {
    let (logger, memory) = memory_logger(LogLevel::Info);
    logger.printf("progress %d%%", &values!["done", 3, "late"]);

    let record = &memory.records()[0];
    assert_eq!(record.message, "progress %d%%");
    assert_eq!(
        record.attributes,
        vec![Attribute::int("done", 3), Attribute::string(EXTRA_KEY, "late")]
    );
    assert!(!LogCall::resolve("progress %d%%", &values!["done", 3, "late"]).is_format());
}

// ============================================================================
// Delivery channel
// ============================================================================

#[test]
fn test_fifo_single_producer() {
    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .handler(memory.clone())
        .queue(QueueCapacity::Unbounded)
        .build()
        .expect("build");
    let receiver = logger.channel().expect("channel");

    for name in ["A", "B", "C"] {
        logger.info(name, &[]);
    }
    drain(&logger, &receiver);

    assert_eq!(memory.messages(), vec!["A", "B", "C"]);
}

#[test]
fn test_close_then_drain_then_error() {
    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .handler(memory.clone())
        .async_mode(4)
        .build()
        .expect("build");
    let receiver = logger.channel().expect("channel");

    logger.info("A", &[]);
    logger.info("B", &[]);
    assert!(logger.close());
    assert!(logger.is_closed());

    let late = logger.submit(Record::new(LogLevel::Info, "C"));
    assert!(matches!(late, Err(LoggerError::ChannelClosed)));

    let drained: Vec<String> = receiver.iter().map(|r| r.message).collect();
    assert_eq!(drained, vec!["A", "B"]);
    assert!(matches!(receiver.try_recv(), Err(LoggerError::ChannelClosed)));
}

#[test]
fn test_close_unblocks_producer_on_full_queue() {
    let logger = Logger::builder()
        .handler(MemoryHandler::new())
        .async_mode(1)
        .overflow_policy(OverflowPolicy::Block)
        .build()
        .expect("build");
    let receiver = logger.channel().expect("channel");
    logger.info("first", &[]);

    let producer = {
        let logger = logger.clone();
        std::thread::spawn(move || logger.submit(Record::new(LogLevel::Info, "second")))
    };
    std::thread::sleep(Duration::from_millis(30));
    assert!(!producer.is_finished(), "producer should wait for room");

    assert!(logger.close());
    let result = producer.join().expect("producer thread");
    assert!(matches!(result, Err(LoggerError::ChannelClosed)));

    let drained: Vec<String> = receiver.iter().map(|r| r.message).collect();
    assert_eq!(drained, vec!["first"]);
}

#[test]
fn test_drain_loop_on_another_thread() {
    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .handler(memory.clone())
        .async_mode(64)
        .overflow_policy(OverflowPolicy::Block)
        .build()
        .expect("build");
    let receiver = logger.channel().expect("channel");

    let consumer = {
        let logger = logger.clone();
        std::thread::spawn(move || {
            for record in receiver.iter() {
                logger.dispatch(&record);
            }
        })
    };

    for i in 0..500 {
        logger.info("item %d", &values![i]);
    }
    logger.close();
    consumer.join().expect("consumer thread");

    assert_eq!(memory.len(), 500);
    assert_eq!(memory.messages()[499], "item 499");
    assert_eq!(logger.dropped_count(), 0);
}

#[test]
fn test_dispatch_workers_and_shutdown() {
    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .handler(memory.clone())
        .async_mode(1024)
        .dispatch_workers(1)
        .build()
        .expect("build");

    for i in 0..100 {
        logger.info("n=%d", &values![i]);
    }
    assert!(logger.shutdown(Duration::from_secs(5)));

    // A single worker preserves submission order
    let messages = memory.messages();
    assert_eq!(messages.len(), 100);
    assert_eq!(messages[0], "n=0");
    assert_eq!(messages[99], "n=99");
}

#[test]
fn test_drop_flushes_pending_records() {
    let memory = MemoryHandler::new();
    {
        let logger = Logger::builder()
            .handler(memory.clone())
            .async_mode(16)
            .build()
            .expect("build");
        logger.info("queued at drop", &[]);
    }
    assert_eq!(memory.messages(), vec!["queued at drop"]);
}

// ============================================================================
// File output
// ============================================================================

#[test]
fn test_file_output_formats() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    for (format, needle) in [
        (OutputFormat::Text, "[INFO ]"),
        (OutputFormat::Json, "\"level\":\"INFO\""),
        (OutputFormat::Logfmt, "level=INFO"),
    ] {
        let path = temp_dir.path().join(format!("{:?}.log", format));
        {
            let handler = WriterHandler::file(&path)
                .expect("Failed to create handler")
                .with_output_format(format);
            let logger = Logger::builder().handler(handler).build().expect("build");
            let ctx = Context::background().with_value("request_id", "r-1");
            logger.log_ctx(&ctx, LogLevel::Info, "saved", &values!["bytes", 512]);
        }

        let content = std::fs::read_to_string(&path).expect("Failed to read log file");
        assert!(content.contains(needle), "{:?} output: {}", format, content);
        assert!(content.contains("r-1"));
        assert!(content.contains("512"));
    }
}

#[test]
fn test_log_injection_is_escaped_in_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("inject.log");
    {
        let logger = Logger::builder()
            .handler(WriterHandler::file(&path).expect("handler"))
            .build()
            .expect("build");
        logger.info("user input\n[ERROR] forged", &[]);
        logger.info("login", &values!["user", "bob\n[ERROR] forged entry"]);

        let ctx = Context::background().with_value("session", "s1\r\n[WARN] spoofed");
        logger.log_ctx(&ctx, LogLevel::Info, "resumed", &[]);

        logger.set_prefix("P\n[ERROR] x");
        logger.info("prefixed", &[]);
    }

    let content = std::fs::read_to_string(&path).expect("read");
    assert_eq!(content.lines().count(), 4);
    assert!(content.contains("user input\\n[ERROR] forged"));
    assert!(content.contains("user=\"bob\\n[ERROR] forged entry\""));
    assert!(content.contains("session=\"s1\\r\\n[WARN] spoofed\""));
    assert!(content.contains("[P\\n[ERROR] x] prefixed"));
}

#[test]
fn test_config_driven_logger() {
    let config = LoggerConfig::from_json(
        r#"{
            "min_level": "debug",
            "prefix": "CFG",
            "queue": { "capacity": "unbounded", "workers": 1 }
        }"#,
    )
    .expect("config");

    let memory = MemoryHandler::new();
    let logger = Logger::builder()
        .config(&config)
        .handler(memory.clone())
        .build()
        .expect("build");

    logger.trace("filtered", &[]);
    logger.debug("kept", &[]);
    assert!(logger.shutdown(Duration::from_secs(5)));

    assert_eq!(memory.messages(), vec!["[CFG] kept"]);
}
