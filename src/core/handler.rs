//! Handler trait for log output destinations

use super::{context::Context, error::LoggerError, error::Result, log_level::LogLevel, record::Record};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A sink (or a composition of sinks) that records are delivered to
///
/// Handlers are shared between producer threads and dispatcher threads, so
/// methods take `&self`; sinks guard their own writers.
///
/// # Example
///
/// ```
/// use rust_structured_logger::{Context, Handler, LogLevel, Record, Result};
///
/// struct StderrHandler;
///
/// impl Handler for StderrHandler {
///     fn enabled(&self, _ctx: &Context, level: LogLevel) -> bool {
///         level >= LogLevel::Warn
///     }
///
///     fn handle(&self, _ctx: &Context, record: &Record) -> Result<()> {
///         eprintln!("{} {}", record.level, record.rendered_message());
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "stderr"
///     }
/// }
/// ```
pub trait Handler: Send + Sync {
    /// Whether a record at `level` would be handled
    ///
    /// Called on every log attempt before anything is formatted, so it must
    /// be cheap and free of side effects.
    fn enabled(&self, ctx: &Context, level: LogLevel) -> bool;

    /// Write one record
    fn handle(&self, ctx: &Context, record: &Record) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

impl<H: Handler + ?Sized> Handler for Arc<H> {
    fn enabled(&self, ctx: &Context, level: LogLevel) -> bool {
        (**self).enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        (**self).handle(ctx, record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn enabled(&self, ctx: &Context, level: LogLevel) -> bool {
        (**self).enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        (**self).handle(ctx, record)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Extract a readable message from a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Call `handle` with panic isolation
///
/// A panic inside the handler is converted into
/// [`LoggerError::HandlerPanic`] instead of unwinding into the caller.
pub(crate) fn handle_isolated(handler: &dyn Handler, ctx: &Context, record: &Record) -> Result<()> {
    match catch_unwind(AssertUnwindSafe(|| handler.handle(ctx, record))) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::handler_panic(
            handler.name(),
            panic_message(payload.as_ref()),
        )),
    }
}

/// Call `flush` with panic isolation
pub(crate) fn flush_isolated(handler: &dyn Handler) -> Result<()> {
    match catch_unwind(AssertUnwindSafe(|| handler.flush())) {
        Ok(result) => result,
        Err(payload) => Err(LoggerError::handler_panic(
            handler.name(),
            panic_message(payload.as_ref()),
        )),
    }
}

/// Handler that accepts nothing; the default when a logger has no sinks
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardHandler;

impl Handler for DiscardHandler {
    fn enabled(&self, _ctx: &Context, _level: LogLevel) -> bool {
        false
    }

    fn handle(&self, _ctx: &Context, _record: &Record) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "discard"
    }
}
