//! Core logger types and traits

pub mod attribute;
pub mod call;
pub mod channel;
pub mod config;
pub mod context;
pub(crate) mod dispatcher;
pub mod error;
pub mod handler;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod overflow_policy;
pub mod record;
pub mod state;
pub mod timestamp;

pub use attribute::{Attribute, Value};
pub use call::{LogCall, EXTRA_KEY};
pub use channel::RecordReceiver;
pub use config::{LoggerConfig, QueueConfig};
pub use context::{Context, ContextGuard};
pub use error::{LoggerError, Result};
pub use handler::{DiscardHandler, Handler};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT};
pub use metrics::LoggerMetrics;
pub use output_format::{OutputFormat, RecordFormatter};
pub use overflow_policy::{ErrorCallback, OverflowCallback, OverflowPolicy, QueueCapacity};
pub use record::{Location, Record};
pub use state::LogState;
pub use timestamp::TimestampFormat;
