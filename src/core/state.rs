//! Process-wide mutable logging state: message prefix and level threshold
//!
//! Both are read on every log call and written rarely. The prefix lives in
//! an `ArcSwapOption`, so a reader always gets a complete string; the level
//! is a single atomic byte. Neither is ever locked across a handler call.

use super::log_level::LogLevel;
use super::record::escape_control;
use arc_swap::ArcSwapOption;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

static GLOBAL_STATE: Lazy<Arc<LogState>> = Lazy::new(|| Arc::new(LogState::new()));

/// Shared prefix + minimum level, injected into loggers
///
/// Loggers built without an explicit state get a private one, so tests can
/// run several loggers side by side. Use [`LogState::global`] to share the
/// process-wide instance.
///
/// # Example
///
/// ```
/// use rust_structured_logger::{LogLevel, LogState};
///
/// let state = LogState::new();
/// state.set_prefix("USER");
/// assert_eq!(state.prefix().as_deref().map(String::as_str), Some("USER"));
///
/// state.set_prefix("");
/// assert!(state.prefix().is_none());
///
/// state.set_min_level(LogLevel::Warn);
/// assert_eq!(state.min_level(), LogLevel::Warn);
/// ```
#[derive(Debug)]
pub struct LogState {
    prefix: ArcSwapOption<String>,
    min_level: AtomicU8,
}

impl LogState {
    pub fn new() -> Self {
        Self::with_level(LogLevel::Info)
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self {
            prefix: ArcSwapOption::empty(),
            min_level: AtomicU8::new(level as u8),
        }
    }

    /// The process-wide singleton
    pub fn global() -> Arc<LogState> {
        Arc::clone(&GLOBAL_STATE)
    }

    /// Set the tag prepended to every subsequent message; `""` clears it
    /// Control characters are stored escaped, like messages
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        let prefix = prefix.into();
        if prefix.is_empty() {
            self.prefix.store(None);
        } else {
            let prefix = escape_control(&prefix).into_owned();
            self.prefix.store(Some(Arc::new(prefix)));
        }
    }

    pub fn clear_prefix(&self) {
        self.prefix.store(None);
    }

    #[inline]
    pub fn prefix(&self) -> Option<Arc<String>> {
        self.prefix.load_full()
    }

    #[inline]
    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_u8(self.min_level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// The level gate: true when `level` passes the threshold
    #[inline]
    pub fn allows(&self, level: LogLevel) -> bool {
        level >= self.min_level()
    }
}

impl Default for LogState {
    fn default() -> Self {
        Self::new()
    }
}
