//! Queue sizing and overflow policies for the delivery channel
//!
//! When a bounded delivery queue is full, the policy decides what happens
//! to the record being submitted. Unbounded queues never overflow.

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Capacity of the delivery channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueCapacity {
    /// At most `n` pending records; `n` must be greater than zero
    Bounded(usize),
    /// Grows without limit; submission never blocks or drops
    Unbounded,
}

impl Default for QueueCapacity {
    fn default() -> Self {
        QueueCapacity::Bounded(1024)
    }
}

impl fmt::Display for QueueCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueCapacity::Bounded(n) => write!(f, "Bounded({})", n),
            QueueCapacity::Unbounded => write!(f, "Unbounded"),
        }
    }
}

/// Policy for handling a full bounded queue
///
/// # Example
///
/// ```
/// use rust_structured_logger::OverflowPolicy;
/// use std::time::Duration;
///
/// // Default behavior: alert and drop
/// let policy = OverflowPolicy::default();
///
/// // Block with timeout
/// let policy = OverflowPolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Block the caller until space is available
    ///
    /// Warning: this applies backpressure to every logging thread. If
    /// nothing drains the channel, callers block forever.
    Block,

    /// Block for at most the given duration, then drop the record
    BlockWithTimeout(#[serde(with = "millis")] Duration),

    /// Drop the new record silently (metrics are still tracked)
    DropNewest,

    /// Evict the oldest queued record to make room for the new one
    DropOldest,

    /// Drop the new record, alert on stderr and through the overflow callback
    ///
    /// The alert fires on the first drop and then every 1000 drops.
    #[default]
    AlertAndDrop,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::DropOldest => write!(f, "DropOldest"),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called when records are dropped due to queue overflow.
/// The parameter is the total count of dropped records so far.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

/// Callback type for handler failures
///
/// Receives every error returned (or panic raised) by the top-level handler.
/// Defaults to a `[LOGGER ERROR]` line on stderr.
pub type ErrorCallback = Arc<dyn Fn(&LoggerError) + Send + Sync>;

pub(crate) fn stderr_error_callback() -> ErrorCallback {
    Arc::new(|err: &LoggerError| eprintln!("[LOGGER ERROR] {}", err))
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_policy_default() {
        assert_eq!(OverflowPolicy::default(), OverflowPolicy::AlertAndDrop);
    }

    #[test]
    fn test_overflow_policy_display() {
        assert_eq!(OverflowPolicy::DropNewest.to_string(), "DropNewest");
        assert_eq!(OverflowPolicy::DropOldest.to_string(), "DropOldest");
        assert_eq!(OverflowPolicy::Block.to_string(), "Block");
        assert_eq!(
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(100)).to_string(),
            "BlockWithTimeout(100ms)"
        );
        assert_eq!(OverflowPolicy::AlertAndDrop.to_string(), "AlertAndDrop");
    }

    #[test]
    fn test_overflow_policy_serde() {
        let policy: OverflowPolicy =
            serde_json::from_str(r#"{"block_with_timeout": 250}"#).expect("deserialize");
        assert_eq!(policy, OverflowPolicy::BlockWithTimeout(Duration::from_millis(250)));

        let policy: OverflowPolicy = serde_json::from_str(r#""drop_oldest""#).expect("deserialize");
        assert_eq!(policy, OverflowPolicy::DropOldest);

        let json = serde_json::to_string(&OverflowPolicy::BlockWithTimeout(Duration::from_secs(1)))
            .expect("serialize");
        assert_eq!(json, r#"{"block_with_timeout":1000}"#);
    }

    #[test]
    fn test_queue_capacity_serde() {
        let capacity: QueueCapacity = serde_json::from_str(r#"{"bounded": 64}"#).expect("deserialize");
        assert_eq!(capacity, QueueCapacity::Bounded(64));

        let capacity: QueueCapacity = serde_json::from_str(r#""unbounded""#).expect("deserialize");
        assert_eq!(capacity, QueueCapacity::Unbounded);
    }
}
