//! Declarative logger configuration
//!
//! A [`LoggerConfig`] captures everything about a logger except its handler,
//! which is code. Missing fields take their defaults, so `{}` is a valid
//! (synchronous, `INFO`) configuration.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::overflow_policy::{OverflowPolicy, QueueCapacity};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Delivery channel settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub capacity: QueueCapacity,
    pub overflow: OverflowPolicy,
    /// Internal dispatcher threads; `0` leaves draining to the caller
    pub workers: usize,
}

/// Serializable logger settings
///
/// # Example
///
/// ```
/// use rust_structured_logger::{LoggerConfig, LogLevel, QueueCapacity};
///
/// let config = LoggerConfig::from_json(r#"{
///     "min_level": "debug",
///     "prefix": "API",
///     "queue": { "capacity": { "bounded": 256 }, "overflow": "drop_oldest" }
/// }"#).unwrap();
///
/// assert_eq!(config.min_level, LogLevel::Debug);
/// assert_eq!(config.queue.unwrap().capacity, QueueCapacity::Bounded(256));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub prefix: Option<String>,
    /// `None` delivers synchronously on the calling thread
    pub queue: Option<QueueConfig>,
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoggerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation("read config", path.display().to_string(), e)
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject settings no logger can be built from
    pub fn validate(&self) -> Result<()> {
        if let Some(queue) = &self.queue {
            if queue.capacity == QueueCapacity::Bounded(0) {
                return Err(LoggerError::config(
                    "queue",
                    "bounded capacity must be greater than zero",
                ));
            }
            if queue.overflow == OverflowPolicy::Block && queue.workers == 0 {
                eprintln!(
                    "[LOGGER WARNING] Block overflow policy without dispatcher workers: \
                     producers stall whenever the caller stops draining"
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_config_is_default() {
        let config = LoggerConfig::from_json("{}").expect("empty config");
        assert_eq!(config, LoggerConfig::default());
        assert_eq!(config.min_level, LogLevel::Info);
        assert!(config.queue.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = LoggerConfig::from_json(
            r#"{
                "min_level": "WARN",
                "prefix": "JOB",
                "queue": {
                    "capacity": "unbounded",
                    "overflow": { "block_with_timeout": 50 },
                    "workers": 2
                }
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.min_level, LogLevel::Warn);
        assert_eq!(config.prefix.as_deref(), Some("JOB"));
        let queue = config.queue.expect("queue");
        assert_eq!(queue.capacity, QueueCapacity::Unbounded);
        assert_eq!(
            queue.overflow,
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(50))
        );
        assert_eq!(queue.workers, 2);
    }

    #[test]
    fn test_zero_capacity_is_configuration_error() {
        let err = LoggerConfig::from_json(r#"{"queue": {"capacity": {"bounded": 0}}}"#)
            .expect_err("zero capacity");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!(LoggerConfig::from_json(r#"{"min_level": "loud"}"#).is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let config = LoggerConfig {
            min_level: LogLevel::Error,
            prefix: Some("FILE".to_string()),
            queue: Some(QueueConfig::default()),
        };

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(config.to_json().expect("serialize").as_bytes())
            .expect("write");

        let loaded = LoggerConfig::from_file(file.path()).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LoggerConfig::from_file("/nonexistent/logger.json").expect_err("missing");
        assert!(err.to_string().contains("read config"));
    }
}
