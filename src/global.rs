//! Process-wide default logger
//!
//! The default is a synchronous console logger on [`LogState::global`], so
//! [`set_prefix`] applies to it. Install a different one with
//! [`set_global`] before first use.

use crate::core::{LogState, Logger, LoggerError, Result};
use crate::handlers::ConsoleHandler;
use once_cell::sync::OnceCell;

static GLOBAL_LOGGER: OnceCell<Logger> = OnceCell::new();

/// Install the process-wide logger
///
/// Fails if a logger is already installed, or if [`global`] has already
/// handed out the default.
pub fn set_global(logger: Logger) -> Result<()> {
    GLOBAL_LOGGER.set(logger).map_err(|_| {
        LoggerError::config("global", "a process-wide logger is already installed")
    })
}

/// The process-wide logger, initialized to the default on first use
pub fn global() -> &'static Logger {
    GLOBAL_LOGGER.get_or_init(|| {
        match Logger::builder()
            .handler(ConsoleHandler::new())
            .state(LogState::global())
            .build()
        {
            Ok(logger) => logger,
            // A synchronous logger has nothing that can fail to build
            Err(e) => {
                eprintln!("[LOGGER CRITICAL] Default logger unavailable: {}", e);
                Logger::new(ConsoleHandler::new())
            }
        }
    })
}

/// Set the process-wide prefix; `""` clears it
pub fn set_prefix(prefix: impl Into<String>) {
    LogState::global().set_prefix(prefix);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_global_is_installed_once() {
        let first = global();
        assert!(Arc::ptr_eq(first.state(), &LogState::global()));

        let err = set_global(Logger::new(ConsoleHandler::new())).expect_err("already installed");
        assert!(err.is_configuration());
        assert!(std::ptr::eq(first, global()));
    }
}
