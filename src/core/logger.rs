//! Logger facade: level gate, record construction and submission

use super::attribute::{Attribute, Value};
use super::call::LogCall;
use super::channel::{DeliveryChannel, RecordReceiver};
use super::config::LoggerConfig;
use super::context::Context;
use super::dispatcher::{join_workers, Dispatcher};
use super::error::{LoggerError, Result};
use super::handler::{DiscardHandler, Handler};
use super::log_level::LogLevel;
use super::metrics::LoggerMetrics;
use super::overflow_policy::{
    stderr_error_callback, ErrorCallback, OverflowCallback, OverflowPolicy, QueueCapacity,
};
use super::record::{Location, Record};
use super::state::LogState;
use crate::handlers::Fanout;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Default timeout for logger shutdown operations
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// State shared by a logger and every logger derived from it
struct Shared {
    dispatcher: Dispatcher,
    state: Arc<LogState>,
    channel: Option<DeliveryChannel>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    metrics: Arc<LoggerMetrics>,
}

impl Shared {
    /// Close, join workers, deliver leftovers, flush
    fn shutdown(&self, timeout: Duration) -> bool {
        let mut clean = true;

        if let Some(channel) = &self.channel {
            channel.close();

            let workers = std::mem::take(&mut *self.workers.lock());
            if !workers.is_empty() {
                clean &= join_workers(workers, timeout);
            }

            // Whatever no consumer picked up is delivered here
            let receiver = channel.receiver();
            for record in receiver.try_iter() {
                self.dispatcher.dispatch(&record);
            }
        }

        if let Err(e) = self.dispatcher.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            clean = false;
        }

        clean
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        // Report any dropped records
        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} dropped records (drop rate: {:.2}%)",
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}

/// The logging facade
///
/// Cheap to clone: clones share the handler, state and delivery pipeline.
/// The pipeline shuts down when the last clone is dropped.
///
/// Every leveled method takes a message plus a slice of [`Value`]s and
/// resolves the call with [`LogCall::resolve`]: a printf-style template whose
/// verb count matches the arguments is rendered, anything else keeps the
/// message and pairs the arguments up as attributes. The `*f` variants always
/// render.
///
/// # Example
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let memory = MemoryHandler::new();
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .handler(memory.clone())
///     .build()
///     .unwrap();
///
/// logger.info("user %s logged in", &["alice".into()]);
/// logger.info("login", &["user".into(), "alice".into()]);
///
/// let records = memory.records();
/// assert_eq!(records[0].message, "user alice logged in");
/// assert_eq!(records[1].message, "login");
/// assert_eq!(records[1].attributes[0].key, "user");
/// ```
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    attrs: Arc<[Attribute]>,
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_structured_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .async_mode(1000)
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Synchronous logger writing to `handler`, with its own state
    pub fn new<H: Handler + 'static>(handler: H) -> Self {
        let metrics = Arc::new(LoggerMetrics::new());
        Self::from_parts(
            Dispatcher::new(Arc::new(handler), Arc::clone(&metrics), stderr_error_callback()),
            Arc::new(LogState::new()),
            None,
            Vec::new(),
            metrics,
            Vec::new(),
        )
    }

    fn from_parts(
        dispatcher: Dispatcher,
        state: Arc<LogState>,
        channel: Option<DeliveryChannel>,
        workers: Vec<thread::JoinHandle<()>>,
        metrics: Arc<LoggerMetrics>,
        attrs: Vec<Attribute>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                dispatcher,
                state,
                channel,
                workers: Mutex::new(workers),
                metrics,
            }),
            attrs: attrs.into(),
        }
    }

    /// Derived logger that adds `attrs` to every record
    ///
    /// The derived logger shares handler, state and pipeline with `self`.
    #[must_use]
    pub fn with_attrs(&self, attrs: impl IntoIterator<Item = Attribute>) -> Logger {
        let merged: Vec<Attribute> = self.attrs.iter().cloned().chain(attrs).collect();
        Logger {
            shared: Arc::clone(&self.shared),
            attrs: merged.into(),
        }
    }

    /// Attributes added to every record by this logger
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    // ---- level gate ----

    /// Whether a record at `level` would be emitted under the ambient context
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.enabled_ctx(&Context::current(), level)
    }

    pub fn enabled_ctx(&self, ctx: &Context, level: LogLevel) -> bool {
        self.shared.state.allows(level) && self.shared.dispatcher.handler().enabled(ctx, level)
    }

    // ---- dual-mode leveled calls ----

    pub fn trace(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Trace, message, args);
    }

    pub fn debug(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Debug, message, args);
    }

    pub fn info(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Info, message, args);
    }

    pub fn warn(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Warn, message, args);
    }

    pub fn error(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Error, message, args);
    }

    /// Emit at `FATAL`; the process keeps running
    pub fn fatal(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Fatal, message, args);
    }

    /// Emit at `PANIC`; nothing unwinds
    pub fn panic(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Panic, message, args);
    }

    /// Dual-mode call at `INFO`
    pub fn printf(&self, message: &str, args: &[Value]) {
        self.log(LogLevel::Info, message, args);
    }

    pub fn log(&self, level: LogLevel, message: &str, args: &[Value]) {
        self.log_ctx(&Context::current(), level, message, args);
    }

    pub fn log_ctx(&self, ctx: &Context, level: LogLevel, message: &str, args: &[Value]) {
        self.emit(ctx, level, None, || LogCall::resolve(message, args).into_parts());
    }

    // ---- printf-only calls ----

    pub fn tracef(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Trace, template, args);
    }

    pub fn debugf(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Debug, template, args);
    }

    pub fn infof(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Info, template, args);
    }

    pub fn warnf(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Warn, template, args);
    }

    pub fn errorf(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Error, template, args);
    }

    pub fn fatalf(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Fatal, template, args);
    }

    pub fn panicf(&self, template: &str, args: &[Value]) {
        self.logf(LogLevel::Panic, template, args);
    }

    pub fn logf(&self, level: LogLevel, template: &str, args: &[Value]) {
        self.logf_ctx(&Context::current(), level, template, args);
    }

    pub fn logf_ctx(&self, ctx: &Context, level: LogLevel, template: &str, args: &[Value]) {
        self.emit(ctx, level, None, || LogCall::format(template, args).into_parts());
    }

    // ---- typed attributes ----

    pub fn log_attrs(&self, level: LogLevel, message: &str, attrs: Vec<Attribute>) {
        self.log_attrs_ctx(&Context::current(), level, message, attrs);
    }

    pub fn log_attrs_ctx(&self, ctx: &Context, level: LogLevel, message: &str, attrs: Vec<Attribute>) {
        self.emit(ctx, level, None, || (message.to_string(), attrs));
    }

    /// Emit a message built with Rust formatting
    ///
    /// The arguments are only rendered if the level is enabled.
    pub fn log_args(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        self.emit(&Context::current(), level, None, || (fmt::format(args), Vec::new()));
    }

    /// Entry point for the logging macros
    #[doc(hidden)]
    pub fn log_at(
        &self,
        level: LogLevel,
        location: Location,
        args: fmt::Arguments<'_>,
        attrs: Vec<Attribute>,
    ) {
        self.emit(&Context::current(), level, Some(location), || {
            (fmt::format(args), attrs)
        });
    }

    fn emit(
        &self,
        ctx: &Context,
        level: LogLevel,
        location: Option<Location>,
        build: impl FnOnce() -> (String, Vec<Attribute>),
    ) {
        if !self.enabled_ctx(ctx, level) {
            return;
        }

        let (message, call_attrs) = build();
        let mut attributes = Vec::with_capacity(self.attrs.len() + call_attrs.len());
        attributes.extend_from_slice(&self.attrs);
        attributes.extend(call_attrs);

        let mut record = Record::new(level, message)
            .with_attributes(attributes)
            .with_context(ctx)
            .with_prefix(self.shared.state.prefix());
        if let Some(location) = location {
            record = record.with_location(location);
        }

        if let Err(e) = self.submit(record) {
            panic!("log record submitted after Logger::close(): {}", e);
        }
    }

    // ---- delivery ----

    /// Hand a record to the pipeline
    ///
    /// Without a delivery channel the record is dispatched on this thread.
    /// Returns [`LoggerError::ChannelClosed`] after [`close`](Self::close).
    /// Records dropped by the overflow policy are not errors.
    pub fn submit(&self, record: Record) -> Result<()> {
        match &self.shared.channel {
            Some(channel) => channel.send(record),
            None => {
                self.shared.dispatcher.dispatch(&record);
                Ok(())
            }
        }
    }

    /// Receive side of the delivery channel, for caller-owned drain loops
    ///
    /// `None` for synchronous loggers.
    pub fn channel(&self) -> Option<RecordReceiver> {
        self.shared.channel.as_ref().map(DeliveryChannel::receiver)
    }

    /// Deliver a drained record to the top-level handler
    ///
    /// Handler errors and panics go to the error callback, never to the
    /// caller.
    pub fn dispatch(&self, record: &Record) {
        self.shared.dispatcher.dispatch(record);
    }

    /// Stop accepting records; queued ones remain drainable
    ///
    /// Logging through the facade afterwards panics. Returns `false` if the
    /// logger was already closed or has no channel.
    pub fn close(&self) -> bool {
        self.shared
            .channel
            .as_ref()
            .map(DeliveryChannel::close)
            .unwrap_or(false)
    }

    pub fn is_closed(&self) -> bool {
        self.shared
            .channel
            .as_ref()
            .map(DeliveryChannel::is_closed)
            .unwrap_or(false)
    }

    pub fn is_async(&self) -> bool {
        self.shared.channel.is_some()
    }

    pub fn queue_capacity(&self) -> Option<QueueCapacity> {
        self.shared.channel.as_ref().map(DeliveryChannel::capacity)
    }

    /// Records waiting in the delivery channel
    pub fn queue_len(&self) -> usize {
        self.shared.channel.as_ref().map(DeliveryChannel::len).unwrap_or(0)
    }

    pub fn flush(&self) -> Result<()> {
        self.shared.dispatcher.flush()
    }

    /// Shutdown the logger with a custom timeout
    ///
    /// Closes the channel, waits up to `timeout` for dispatcher threads to
    /// drain it, delivers any records nobody drained, then flushes.
    ///
    /// # Returns
    ///
    /// `true` if shutdown completed successfully within timeout, `false` otherwise
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_structured_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::builder()
    ///     .handler(ConsoleHandler::new())
    ///     .async_mode(1000)
    ///     .dispatch_workers(1)
    ///     .build()
    ///     .unwrap();
    /// logger.info("Important message", &[]);
    ///
    /// if !logger.shutdown(Duration::from_secs(10)) {
    ///     eprintln!("Warning: Logger shutdown timed out");
    /// }
    /// ```
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.shared.shutdown(timeout)
    }

    // ---- state ----

    pub fn state(&self) -> &Arc<LogState> {
        &self.shared.state
    }

    /// Set the prefix on this logger's state; `""` clears it
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.shared.state.set_prefix(prefix);
    }

    pub fn prefix(&self) -> Option<Arc<String>> {
        self.shared.state.prefix()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.shared.state.set_min_level(level);
    }

    pub fn min_level(&self) -> LogLevel {
        self.shared.state.min_level()
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        self.shared.dispatcher.handler()
    }

    // ---- metrics ----

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.shared.metrics
    }

    /// Get the number of dropped records
    ///
    /// Counts records discarded by the overflow policy. Useful for
    /// monitoring logger health.
    pub fn dropped_count(&self) -> u64 {
        self.shared.metrics.dropped_count()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("handler", &self.handler().name())
            .field("min_level", &self.min_level())
            .field("queue", &self.queue_capacity())
            .field("attrs", &self.attrs.len())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_structured_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .handler(ConsoleHandler::new())
///     .async_mode(1000)
///     .overflow_policy(OverflowPolicy::AlertAndDrop)
///     .on_overflow(Arc::new(|count| {
///         eprintln!("ALERT: {} records dropped", count);
///     }))
///     .build()
///     .unwrap();
/// ```
pub struct LoggerBuilder {
    handlers: Vec<Arc<dyn Handler>>,
    state: Option<Arc<LogState>>,
    min_level: Option<LogLevel>,
    prefix: Option<String>,
    queue: Option<QueueCapacity>,
    overflow_policy: OverflowPolicy,
    workers: usize,
    on_overflow: Option<OverflowCallback>,
    on_error: Option<ErrorCallback>,
    attrs: Vec<Attribute>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            state: None,
            min_level: None,
            prefix: None,
            queue: None,
            overflow_policy: OverflowPolicy::AlertAndDrop,
            workers: 0,
            on_overflow: None,
            on_error: None,
            attrs: Vec::new(),
        }
    }

    /// Add a handler
    ///
    /// Several handlers are combined into a [`Fanout`] in the order added.
    #[must_use = "builder methods return a new value"]
    pub fn handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Share prefix and level state, e.g. [`LogState::global`]
    ///
    /// Without this the logger gets a private state.
    #[must_use = "builder methods return a new value"]
    pub fn state(mut self, state: Arc<LogState>) -> Self {
        self.state = Some(state);
        self
    }

    /// Set minimum log level
    ///
    /// Written into the logger's state when built.
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Deliver through a channel of the given capacity
    ///
    /// If not called, the logger dispatches synchronously on the calling
    /// thread.
    #[must_use = "builder methods return a new value"]
    pub fn queue(mut self, capacity: QueueCapacity) -> Self {
        self.queue = Some(capacity);
        self
    }

    /// Deliver through a bounded channel of `buffer_size` records
    #[must_use = "builder methods return a new value"]
    pub fn async_mode(self, buffer_size: usize) -> Self {
        self.queue(QueueCapacity::Bounded(buffer_size))
    }

    /// Set the overflow policy for a full bounded channel
    ///
    /// Default is `AlertAndDrop`.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_structured_logger::prelude::*;
    /// use std::time::Duration;
    ///
    /// let logger = Logger::builder()
    ///     .async_mode(100)
    ///     .overflow_policy(OverflowPolicy::BlockWithTimeout(Duration::from_millis(50)))
    ///     .build()
    ///     .unwrap();
    /// ```
    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Drain the channel with `count` internal threads
    ///
    /// `0` (the default) leaves draining to the caller through
    /// [`Logger::channel`].
    #[must_use = "builder methods return a new value"]
    pub fn dispatch_workers(mut self, count: usize) -> Self {
        self.workers = count;
        self
    }

    /// Set a callback for overflow notifications
    ///
    /// The callback is invoked when records are dropped due to queue
    /// overflow. The parameter is the total count of dropped records.
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Replace the default stderr report for handler failures
    #[must_use = "builder methods return a new value"]
    pub fn on_error(mut self, callback: ErrorCallback) -> Self {
        self.on_error = Some(callback);
        self
    }

    /// Attributes added to every record
    #[must_use = "builder methods return a new value"]
    pub fn attrs(mut self, attrs: impl IntoIterator<Item = Attribute>) -> Self {
        self.attrs.extend(attrs);
        self
    }

    /// Apply a declarative configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: &LoggerConfig) -> Self {
        self.min_level = Some(config.min_level);
        if let Some(prefix) = &config.prefix {
            self.prefix = Some(prefix.clone());
        }
        if let Some(queue) = &config.queue {
            self.queue = Some(queue.capacity);
            self.overflow_policy = queue.overflow.clone();
            self.workers = queue.workers;
        }
        self
    }

    /// Build the Logger
    ///
    /// Fails with [`LoggerError::InvalidConfiguration`] for a zero bounded
    /// capacity or dispatcher workers without a channel, and with an IO
    /// error if a worker thread cannot be spawned.
    pub fn build(self) -> Result<Logger> {
        if self.workers > 0 && self.queue.is_none() {
            return Err(LoggerError::config(
                "LoggerBuilder",
                "dispatch workers require a delivery queue",
            ));
        }

        let mut handlers = self.handlers;
        let handler: Arc<dyn Handler> = match handlers.len() {
            0 => Arc::new(DiscardHandler),
            1 => handlers.remove(0),
            _ => Arc::new(Fanout::new(handlers)),
        };

        let metrics = Arc::new(LoggerMetrics::new());
        let on_error = self.on_error.unwrap_or_else(stderr_error_callback);
        let dispatcher = Dispatcher::new(handler, Arc::clone(&metrics), on_error);

        let channel = match self.queue {
            Some(capacity) => Some(DeliveryChannel::new(
                capacity,
                self.overflow_policy,
                self.on_overflow,
                Arc::clone(&metrics),
            )?),
            None => None,
        };

        let workers = match &channel {
            Some(channel) if self.workers > 0 => {
                dispatcher.spawn_workers(&channel.raw_receiver(), self.workers)?
            }
            _ => Vec::new(),
        };

        let state = self.state.unwrap_or_else(|| Arc::new(LogState::new()));
        if let Some(level) = self.min_level {
            state.set_min_level(level);
        }
        if let Some(prefix) = self.prefix {
            state.set_prefix(prefix);
        }

        Ok(Logger::from_parts(
            dispatcher, state, channel, workers, metrics, self.attrs,
        ))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
