//! Logging macros for ergonomic log message formatting.
//!
//! Two call shapes are accepted:
//!
//! - Rust format syntax, like `println!`: `info!(logger, "listening on {}", port)`
//! - a literal message followed by typed pairs: `info!(logger, "login"; "user" => "alice")`
//!
//! Both capture `file!()`, `line!()` and `module_path!()`, and nothing is
//! formatted unless the level is enabled.
//!
//! # Examples
//!
//! ```
//! use rust_structured_logger::prelude::*;
//! use rust_structured_logger::info;
//!
//! let logger = Logger::new(MemoryHandler::new());
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With structured pairs
//! info!(logger, "request served"; "status" => 200, "path" => "/health");
//! ```

/// Source location of the macro call site
#[doc(hidden)]
#[macro_export]
macro_rules! __location {
    () => {
        $crate::Location {
            file: file!(),
            line: line!(),
            module_path: module_path!(),
        }
    };
}

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(MemoryHandler::new());
/// use rust_structured_logger::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, "retrying"; "attempt" => 3);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $msg:literal; $($key:expr => $value:expr),+ $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log_at(
                level,
                $crate::__location!(),
                format_args!($msg),
                vec![$($crate::Attribute::new($key, $value)),+],
            );
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        logger.log_at($level, $crate::__location!(), format_args!($($arg)+), Vec::new());
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(MemoryHandler::new());
/// # logger.set_min_level(LogLevel::Trace);
/// use rust_structured_logger::trace;
/// trace!(logger, "Entering function: calculate()");
/// trace!(logger, "Variable value: {}", 42);
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(MemoryHandler::new());
/// use rust_structured_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// info!(logger, "batch done"; "items" => 100, "ok" => true);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(MemoryHandler::new());
/// use rust_structured_logger::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. The process keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

/// Build a `[Value; N]` for the dual-mode logger methods.
///
/// # Examples
///
/// ```
/// # use rust_structured_logger::prelude::*;
/// # let logger = Logger::new(MemoryHandler::new());
/// use rust_structured_logger::values;
/// logger.info("user %s has %d items", &values!["alice", 3]);
/// logger.info("checkout", &values!["user", "alice", "total", 9.5]);
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        [$($crate::Value::from($value)),*]
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{Attribute, LogLevel, Logger, Value};
    use crate::handlers::MemoryHandler;

    fn logger() -> (Logger, MemoryHandler) {
        let memory = MemoryHandler::new();
        let logger = Logger::new(memory.clone());
        logger.set_min_level(LogLevel::Trace);
        (logger, memory)
    }

    #[test]
    fn test_log_macro_formats() {
        let (logger, memory) = logger();
        log!(logger, LogLevel::Info, "Test message");
        log!(logger, LogLevel::Info, "Formatted: {}", 42);
        assert_eq!(memory.messages(), vec!["Test message", "Formatted: 42"]);
    }

    #[test]
    fn test_leveled_macros() {
        let (logger, memory) = logger();
        trace!(logger, "t");
        debug!(logger, "d {}", 1);
        info!(logger, "i");
        warn!(logger, "w {} of {}", 1, 3);
        error!(logger, "e");
        fatal!(logger, "f");

        let levels: Vec<LogLevel> = memory.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, LogLevel::ALL[..6].to_vec());
    }

    #[test]
    fn test_structured_arm() {
        let (logger, memory) = logger();
        info!(logger, "request served"; "status" => 200, "path" => "/health",);

        let record = &memory.records()[0];
        assert_eq!(record.message, "request served");
        assert_eq!(
            record.attributes,
            vec![Attribute::int("status", 200), Attribute::string("path", "/health")]
        );
    }

    #[test]
    fn test_location_captured() {
        let (logger, memory) = logger();
        info!(logger, "here");

        let location = memory.records()[0].location.expect("location");
        assert!(location.file.ends_with("macros.rs"));
        assert!(location.module_path.ends_with("macros::tests"));
    }

    #[test]
    fn test_disabled_level_does_not_evaluate_pairs() {
        let (logger, memory) = logger();
        logger.set_min_level(LogLevel::Error);

        let mut evaluated = false;
        debug!(logger, "skipped"; "k" => {
            evaluated = true;
            1
        });

        assert!(!evaluated);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_values_macro() {
        let values = values!["a", 1, true, 2.5];
        assert_eq!(
            values,
            [
                Value::from("a"),
                Value::Int(1),
                Value::Bool(true),
                Value::Float(2.5)
            ]
        );
    }
}
