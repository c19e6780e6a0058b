//! # Rust Structured Logger
//!
//! An asynchronous structured-logging core: typed records, composable
//! handlers, context-scoped key/value propagation and a channel-backed
//! delivery pipeline.
//!
//! ## Features
//!
//! - **Dual-mode calls**: `logger.info("user %s", &values!["alice"])` renders
//!   printf-style, `logger.info("login", &values!["user", "alice"])` attaches
//!   attributes
//! - **Fan-out**: one record, many sinks, failures isolated per sink
//! - **Context propagation**: immutable [`Context`] chains, explicit or ambient
//! - **Async delivery**: bounded or unbounded channel with explicit overflow
//!   policies, drained by the caller or by internal dispatcher threads
//!
//! ```
//! use rust_structured_logger::prelude::*;
//!
//! let memory = MemoryHandler::new();
//! let logger = Logger::builder()
//!     .handler(memory.clone())
//!     .queue(QueueCapacity::Bounded(128))
//!     .build()
//!     .unwrap();
//!
//! let receiver = logger.channel().unwrap();
//! logger.info("order placed", &values!["order_id", 42]);
//!
//! while let Ok(Some(record)) = receiver.try_recv() {
//!     logger.dispatch(&record);
//! }
//! assert_eq!(memory.records()[0].attributes[0].key, "order_id");
//! ```

pub mod core;
pub mod global;
pub mod handlers;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        Attribute, Context, ContextGuard, Handler, LogLevel, LogState, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, LoggerMetrics, OutputFormat, OverflowCallback, OverflowPolicy,
        QueueCapacity, Record, RecordReceiver, Result, TimestampFormat, Value,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::handlers::{ConsoleHandler, Fanout, LevelHandler, MemoryHandler, WriterHandler};
    pub use crate::values;
}

pub use crate::core::{
    Attribute, Context, ContextGuard, DiscardHandler, ErrorCallback, Handler, Location, LogCall,
    LogLevel, LogState, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    OutputFormat, OverflowCallback, OverflowPolicy, QueueCapacity, QueueConfig, Record,
    RecordFormatter, RecordReceiver, Result, TimestampFormat, Value, DEFAULT_SHUTDOWN_TIMEOUT,
    EXTRA_KEY,
};
pub use global::{global, set_global, set_prefix};
pub use handlers::{ConsoleHandler, Fanout, LevelHandler, MemoryHandler, WriterHandler};
