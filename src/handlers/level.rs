//! Level threshold wrapper

use crate::core::{Context, Handler, LogLevel, Record, Result};

/// Passes records at or above `min_level` to the wrapped handler
///
/// Narrows an inner handler; it can never enable a level the inner handler
/// rejects.
#[derive(Debug, Clone)]
pub struct LevelHandler<H> {
    min_level: LogLevel,
    inner: H,
}

impl<H: Handler> LevelHandler<H> {
    pub fn new(min_level: LogLevel, inner: H) -> Self {
        Self { min_level, inner }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H: Handler> Handler for LevelHandler<H> {
    fn enabled(&self, ctx: &Context, level: LogLevel) -> bool {
        level >= self.min_level && self.inner.enabled(ctx, level)
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        self.inner.handle(ctx, record)
    }

    fn flush(&self) -> Result<()> {
        self.inner.flush()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
