//! Record dispatch: hands drained records to the top-level handler
//!
//! Used both by caller-owned drain loops (through `Logger::dispatch`) and by
//! the optional internal worker threads, which drain the channel in batches.

use super::error::Result;
use super::handler::{flush_isolated, handle_isolated, Handler};
use super::metrics::LoggerMetrics;
use super::overflow_policy::ErrorCallback;
use super::record::Record;
use crossbeam_channel::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Maximum records handled between flushes
const BATCH_SIZE: usize = 50;

/// Grace period for a small batch to fill up
const BATCH_TIMEOUT_MS: u64 = 10;

/// Delivers records to a handler and reports what goes wrong
///
/// Errors and panics raised by the handler never reach the caller: they are
/// counted and passed to the error callback.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    handler: Arc<dyn Handler>,
    metrics: Arc<LoggerMetrics>,
    on_error: ErrorCallback,
}

impl Dispatcher {
    pub(crate) fn new(
        handler: Arc<dyn Handler>,
        metrics: Arc<LoggerMetrics>,
        on_error: ErrorCallback,
    ) -> Self {
        Self {
            handler,
            metrics,
            on_error,
        }
    }

    pub(crate) fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub(crate) fn dispatch(&self, record: &Record) {
        match handle_isolated(self.handler.as_ref(), record.origin(), record) {
            Ok(()) => {
                self.metrics.record_delivered();
            }
            Err(e) => {
                self.metrics.record_handler_error();
                (self.on_error)(&e);
            }
        }
    }

    /// Dispatch every record in order, then flush once
    pub(crate) fn dispatch_batch(&self, batch: &[Record]) {
        for record in batch {
            self.dispatch(record);
        }
        if let Err(e) = self.flush() {
            (self.on_error)(&e);
        }
    }

    pub(crate) fn flush(&self) -> Result<()> {
        flush_isolated(self.handler.as_ref())
    }

    /// Start `count` worker threads draining `receiver`
    ///
    /// Workers exit once the channel is closed and empty.
    pub(crate) fn spawn_workers(
        &self,
        receiver: &Receiver<Record>,
        count: usize,
    ) -> Result<Vec<thread::JoinHandle<()>>> {
        let mut handles = Vec::with_capacity(count);
        for index in 0..count {
            let dispatcher = self.clone();
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("log-dispatch-{}", index))
                .spawn(move || dispatcher.run(&receiver))?;
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Worker loop: block for one record, then gather up to a batch
    fn run(&self, receiver: &Receiver<Record>) {
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        loop {
            match receiver.recv() {
                Ok(record) => batch.push(record),
                Err(_) => break, // Closed and drained
            }

            Self::fill(receiver, &mut batch);

            if batch.len() < BATCH_SIZE {
                // Small batch - wait a bit for more records
                thread::sleep(Duration::from_millis(BATCH_TIMEOUT_MS));
                Self::fill(receiver, &mut batch);
            }

            self.dispatch_batch(&batch);
            batch.clear();
        }
    }

    fn fill(receiver: &Receiver<Record>, batch: &mut Vec<Record>) {
        while batch.len() < BATCH_SIZE {
            match receiver.try_recv() {
                Ok(record) => batch.push(record),
                Err(_) => break,
            }
        }
    }
}

/// Join worker threads, giving up once `timeout` has elapsed
///
/// Returns `true` if every worker finished in time without panicking.
pub(crate) fn join_workers(handles: Vec<thread::JoinHandle<()>>, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    let mut clean = true;

    for handle in handles {
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Dispatch worker panicked during shutdown: {:?}", e);
                    clean = false;
                }
                break;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Dispatch worker did not finish within {:?} timeout. \
                     Some records may be lost.",
                    timeout
                );
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }

    clean
}
