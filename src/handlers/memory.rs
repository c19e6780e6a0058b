//! In-memory sink, for tests and for inspecting what a logger emitted

use crate::core::{Context, Handler, LogLevel, Record, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps every handled record in memory
///
/// Clones share the same storage, so a clone can be handed to a logger
/// while the original is used to inspect the output.
#[derive(Debug, Clone)]
pub struct MemoryHandler {
    records: Arc<Mutex<Vec<Record>>>,
    min_level: LogLevel,
}

impl MemoryHandler {
    /// Accepts every level
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            min_level: LogLevel::Trace,
        }
    }

    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Copy of the records handled so far
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Rendered messages (prefix included) of the records handled so far
    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(Record::rendered_message).collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Remove and return everything handled so far
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for MemoryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for MemoryHandler {
    fn enabled(&self, _ctx: &Context, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn handle(&self, _ctx: &Context, record: &Record) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let memory = MemoryHandler::new();
        let clone = memory.clone();

        clone
            .handle(&Context::background(), &Record::new(LogLevel::Info, "shared"))
            .expect("handle");

        assert_eq!(memory.len(), 1);
        assert_eq!(memory.messages(), vec!["shared"]);
        assert_eq!(memory.take().len(), 1);
        assert!(clone.is_empty());
    }

    #[test]
    fn test_min_level() {
        let memory = MemoryHandler::new().with_min_level(LogLevel::Warn);
        let ctx = Context::background();
        assert!(!memory.enabled(&ctx, LogLevel::Info));
        assert!(memory.enabled(&ctx, LogLevel::Warn));
    }
}
