//! Fan-out handler: one record, many sinks

use crate::core::handler::{flush_isolated, handle_isolated};
use crate::core::{Context, Handler, LogLevel, LoggerError, Record, Result};
use std::sync::Arc;

/// Delivers each record to every enabled member, in insertion order
///
/// A failing (or panicking) member never stops the others; its error is
/// tagged with the member's name and all failures are aggregated into the
/// returned result. Fanouts can be nested.
///
/// # Example
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let errors = MemoryHandler::new().with_min_level(LogLevel::Error);
/// let everything = MemoryHandler::new().with_min_level(LogLevel::Trace);
/// let fanout = Fanout::new(vec![]).with(errors.clone()).with(everything.clone());
///
/// let record = Record::new(LogLevel::Info, "hello");
/// fanout.handle(&Context::background(), &record).unwrap();
///
/// assert_eq!(errors.len(), 0);
/// assert_eq!(everything.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Fanout {
    members: Vec<Arc<dyn Handler>>,
}

impl Fanout {
    pub fn new(members: Vec<Arc<dyn Handler>>) -> Self {
        Self { members }
    }

    /// Append a member
    #[must_use]
    pub fn with<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.members.push(Arc::new(handler));
        self
    }

    pub fn members(&self) -> &[Arc<dyn Handler>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

fn tag(member: &dyn Handler, err: LoggerError) -> LoggerError {
    match err {
        // Already carries the member name
        LoggerError::HandlerPanic { .. } => err,
        err => LoggerError::handler(member.name(), err),
    }
}

impl Handler for Fanout {
    fn enabled(&self, ctx: &Context, level: LogLevel) -> bool {
        self.members.iter().any(|m| m.enabled(ctx, level))
    }

    fn handle(&self, ctx: &Context, record: &Record) -> Result<()> {
        let mut errors = Vec::new();
        for member in &self.members {
            if !member.enabled(ctx, record.level) {
                continue;
            }
            if let Err(e) = handle_isolated(member.as_ref(), ctx, record) {
                errors.push(tag(member.as_ref(), e));
            }
        }
        LoggerError::aggregate(errors)
    }

    fn flush(&self) -> Result<()> {
        let errors = self
            .members
            .iter()
            .filter_map(|m| flush_isolated(m.as_ref()).err().map(|e| tag(m.as_ref(), e)))
            .collect();
        LoggerError::aggregate(errors)
    }

    fn name(&self) -> &str {
        "fanout"
    }
}

impl std::fmt::Debug for Fanout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.members.iter().map(|m| m.name()))
            .finish()
    }
}
