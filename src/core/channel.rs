//! Delivery channel between log producers and record consumers
//!
//! Producers push finished [`Record`]s; consumers (a caller-owned drain loop
//! or the internal dispatcher threads) pull them in FIFO order. A full
//! bounded queue is resolved by the configured [`OverflowPolicy`].

use super::error::{LoggerError, Result};
use super::metrics::LoggerMetrics;
use super::overflow_policy::{OverflowCallback, OverflowPolicy, QueueCapacity};
use super::record::Record;
use crossbeam_channel::{
    bounded, unbounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender, TryRecvError,
    TrySendError,
};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Eviction attempts under `DropOldest` before the new record is dropped
const MAX_EVICTION_ATTEMPTS: usize = 8;

/// Longest single wait of a blocked producer before it re-checks for a close
const BLOCK_SLICE: Duration = Duration::from_millis(10);

/// Alert on the first drop and then every this many drops
const ALERT_INTERVAL: u64 = 1000;

/// Producer side of the delivery channel
///
/// The sender sits behind a lock so [`close`](Self::close) can take it.
/// Sends hold the read lock while they enqueue, so nothing is accepted once
/// `close` returns; a producer blocked on a full queue releases it between
/// short waits.
pub(crate) struct DeliveryChannel {
    sender: RwLock<Option<Sender<Record>>>,
    receiver: Receiver<Record>,
    capacity: QueueCapacity,
    policy: OverflowPolicy,
    on_overflow: Option<OverflowCallback>,
    metrics: Arc<LoggerMetrics>,
}

impl DeliveryChannel {
    pub(crate) fn new(
        capacity: QueueCapacity,
        policy: OverflowPolicy,
        on_overflow: Option<OverflowCallback>,
        metrics: Arc<LoggerMetrics>,
    ) -> Result<Self> {
        let (sender, receiver) = match capacity {
            QueueCapacity::Bounded(0) => {
                return Err(LoggerError::config(
                    "queue",
                    "bounded capacity must be greater than zero",
                ))
            }
            QueueCapacity::Bounded(n) => bounded(n),
            QueueCapacity::Unbounded => unbounded(),
        };

        Ok(Self {
            sender: RwLock::new(Some(sender)),
            receiver,
            capacity,
            policy,
            on_overflow,
            metrics,
        })
    }

    pub(crate) fn capacity(&self) -> QueueCapacity {
        self.capacity
    }

    pub(crate) fn receiver(&self) -> RecordReceiver {
        RecordReceiver {
            inner: self.receiver.clone(),
        }
    }

    pub(crate) fn raw_receiver(&self) -> Receiver<Record> {
        self.receiver.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.sender.read().is_none()
    }

    /// Stop accepting records; queued records stay drainable
    ///
    /// Returns `false` if the channel was already closed.
    pub(crate) fn close(&self) -> bool {
        self.sender.write().take().is_some()
    }

    /// Submit a record, applying the overflow policy if the queue is full
    ///
    /// Dropping a record under the policy is not an error; only a closed
    /// channel is.
    pub(crate) fn send(&self, record: Record) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(LoggerError::ChannelClosed)?;

        let record = match sender.try_send(record) {
            Ok(()) => {
                self.metrics.record_enqueued();
                return Ok(());
            }
            Err(TrySendError::Full(record)) => record,
            Err(TrySendError::Disconnected(_)) => return Err(LoggerError::ChannelClosed),
        };
        self.metrics.record_queue_full();

        match &self.policy {
            OverflowPolicy::Block => {
                drop(guard);
                self.metrics.record_block();
                self.send_blocking(record, None)?;
            }

            OverflowPolicy::BlockWithTimeout(timeout) => {
                drop(guard);
                self.metrics.record_block();
                if !self.send_blocking(record, Some(*timeout))? {
                    self.alert_and_drop();
                }
            }

            OverflowPolicy::DropNewest => {
                self.metrics.record_dropped();
            }

            OverflowPolicy::DropOldest => {
                let enqueued = self.drop_oldest(sender, record)?;
                drop(guard);
                if !enqueued {
                    self.alert_and_drop();
                }
            }

            OverflowPolicy::AlertAndDrop => {
                drop(guard);
                self.alert_and_drop();
            }
        }

        Ok(())
    }

    /// Wait for room in slices, re-checking for a close between slices
    ///
    /// Returns `Ok(false)` if `timeout` elapsed first and
    /// [`LoggerError::ChannelClosed`] if the channel was closed meanwhile.
    /// The sender lock is held only for one slice, so `close` waits at most
    /// [`BLOCK_SLICE`].
    fn send_blocking(&self, mut record: Record, timeout: Option<Duration>) -> Result<bool> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let slice = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(false);
                    }
                    (deadline - now).min(BLOCK_SLICE)
                }
                None => BLOCK_SLICE,
            };

            let guard = self.sender.read();
            let sender = guard.as_ref().ok_or(LoggerError::ChannelClosed)?;
            match sender.send_timeout(record, slice) {
                Ok(()) => {
                    self.metrics.record_enqueued();
                    return Ok(true);
                }
                Err(SendTimeoutError::Timeout(rejected)) => record = rejected,
                Err(SendTimeoutError::Disconnected(_)) => return Err(LoggerError::ChannelClosed),
            }
        }
    }

    /// Evict queue heads until the new record fits
    ///
    /// Consumers race with us for the head, so the loop is bounded; if the
    /// queue keeps refilling the new record is given up and `false` returned.
    fn drop_oldest(&self, sender: &Sender<Record>, mut record: Record) -> Result<bool> {
        for _ in 0..MAX_EVICTION_ATTEMPTS {
            if self.receiver.try_recv().is_ok() {
                self.metrics.record_evicted();
            }

            match sender.try_send(record) {
                Ok(()) => {
                    self.metrics.record_enqueued();
                    return Ok(true);
                }
                Err(TrySendError::Full(rejected)) => record = rejected,
                Err(TrySendError::Disconnected(_)) => return Err(LoggerError::ChannelClosed),
            }
        }

        Ok(false)
    }

    fn alert_and_drop(&self) {
        let dropped_count = self.metrics.record_dropped() + 1;

        if dropped_count == 1 || dropped_count % ALERT_INTERVAL == 0 {
            eprintln!(
                "[LOGGER WARNING] Queue full ({}), {} records dropped. \
                 Consider increasing the capacity or draining faster.",
                self.capacity, dropped_count
            );

            if let Some(ref callback) = self.on_overflow {
                callback(dropped_count);
            }
        }
    }
}

/// Receive-only handle on a logger's delivery channel
///
/// Cloning yields another consumer of the same queue; each record is
/// received by exactly one consumer. Once the logger is closed, receiving
/// continues until the queue is empty and then reports the close.
///
/// # Example
///
/// ```
/// use rust_structured_logger::prelude::*;
///
/// let memory = MemoryHandler::new();
/// let logger = Logger::builder()
///     .handler(memory.clone())
///     .queue(QueueCapacity::Bounded(16))
///     .build()
///     .unwrap();
///
/// let receiver = logger.channel().unwrap();
/// logger.info("queued", &[]);
/// logger.close();
///
/// for record in receiver.iter() {
///     logger.dispatch(&record);
/// }
/// assert_eq!(memory.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecordReceiver {
    inner: Receiver<Record>,
}

impl RecordReceiver {
    /// Block until a record arrives; `None` once closed and drained
    pub fn recv(&self) -> Option<Record> {
        self.inner.recv().ok()
    }

    /// `Ok(None)` when the queue is momentarily empty,
    /// `Err(ChannelClosed)` when it is closed and drained
    pub fn try_recv(&self) -> Result<Option<Record>> {
        match self.inner.try_recv() {
            Ok(record) => Ok(Some(record)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LoggerError::ChannelClosed),
        }
    }

    /// Like [`try_recv`](Self::try_recv) but waits up to `timeout`
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<Record>> {
        match self.inner.recv_timeout(timeout) {
            Ok(record) => Ok(Some(record)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(LoggerError::ChannelClosed),
        }
    }

    /// Blocking iterator that ends when the channel is closed and drained
    pub fn iter(&self) -> impl Iterator<Item = Record> + '_ {
        self.inner.iter()
    }

    /// Iterator over the records queued right now
    pub fn try_iter(&self) -> impl Iterator<Item = Record> + '_ {
        self.inner.try_iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// The underlying crossbeam receiver, for use with `select!`
    pub fn as_inner(&self) -> &Receiver<Record> {
        &self.inner
    }
}
