//! DriftConsumer - background service draining the inbound drift stream.
//!
//! Reads batches from a [`DriftEventLog`] consumer group and hands each entry
//! to [`HandleDriftEventHandler`]. Delivery is at-least-once:
//!
//! 1. Successful and non-retryable outcomes are acknowledged
//! 2. Retryable failures stay in the group's pending list
//! 3. The pending list is re-read at startup and then on an interval
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `pending_retry_interval` | 30s | How often unacked entries are re-read |
//! | `error_backoff` | 2s | Pause after a failed stream read |
//!
//! ## Graceful Shutdown
//!
//! The shutdown signal interrupts a blocking read. A batch that was already
//! read is handled to completion before the loop exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

use crate::application::handlers::drift::{
    DriftOutcome, HandleDriftEventCommand, HandleDriftEventHandler,
};
use crate::config::StreamsConfig;
use crate::domain::foundation::DomainError;
use crate::ports::{DriftEventLog, ReadCursor, StreamEntry};

/// Configuration for the DriftConsumer service.
#[derive(Debug, Clone)]
pub struct DriftConsumerConfig {
    /// How often the pending list is re-read.
    pub pending_retry_interval: Duration,

    /// Pause after a failed read before trying again.
    pub error_backoff: Duration,
}

impl Default for DriftConsumerConfig {
    fn default() -> Self {
        Self {
            pending_retry_interval: Duration::from_secs(30),
            error_backoff: Duration::from_secs(2),
        }
    }
}

impl DriftConsumerConfig {
    pub fn with_pending_retry_interval(mut self, interval: Duration) -> Self {
        self.pending_retry_interval = interval;
        self
    }

    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }
}

impl From<&StreamsConfig> for DriftConsumerConfig {
    fn from(config: &StreamsConfig) -> Self {
        Self {
            pending_retry_interval: config.pending_retry_interval(),
            error_backoff: config.error_backoff(),
        }
    }
}

/// Counts from handling one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub read: usize,
    pub acked: usize,
    pub left_pending: usize,
}

/// Background service that applies drift events.
pub struct DriftConsumer {
    log: Arc<dyn DriftEventLog>,
    handler: Arc<HandleDriftEventHandler>,
    config: DriftConsumerConfig,
    running: Arc<AtomicBool>,
}

impl DriftConsumer {
    pub fn new(log: Arc<dyn DriftEventLog>, handler: Arc<HandleDriftEventHandler>) -> Self {
        Self::with_config(log, handler, DriftConsumerConfig::default())
    }

    pub fn with_config(
        log: Arc<dyn DriftEventLog>,
        handler: Arc<HandleDriftEventHandler>,
        config: DriftConsumerConfig,
    ) -> Self {
        Self {
            log,
            handler,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag that is `true` while [`run`](Self::run) is looping.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the consumer loop until the shutdown signal is received.
    ///
    /// # Errors
    ///
    /// Returns an error only if the consumer group cannot be created. Read,
    /// handling, and ack failures are logged and the loop continues.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        self.log.ensure_group().await?;
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Drift consumer started");

        // Startup pass over whatever a previous run left unacknowledged.
        let mut next_pending_sweep = Instant::now();

        loop {
            if *shutdown.borrow() {
                break;
            }

            let cursor = if Instant::now() >= next_pending_sweep {
                next_pending_sweep = Instant::now() + self.config.pending_retry_interval;
                ReadCursor::Pending
            } else {
                ReadCursor::New
            };

            let read = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                read = self.log.read_batch(cursor) => read,
            };

            match read {
                Ok(entries) => {
                    let report = self.process_entries(entries).await;
                    if report.read > 0 {
                        tracing::debug!(
                            cursor = ?cursor,
                            read = report.read,
                            acked = report.acked,
                            left_pending = report.left_pending,
                            "Drift batch handled"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read drift stream");
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Drift consumer stopped");
        Ok(())
    }

    /// Read and handle one batch from `cursor`.
    pub async fn poll_once(&self, cursor: ReadCursor) -> Result<BatchReport, DomainError> {
        let entries = self.log.read_batch(cursor).await?;
        Ok(self.process_entries(entries).await)
    }

    async fn process_entries(&self, entries: Vec<StreamEntry>) -> BatchReport {
        let mut report = BatchReport {
            read: entries.len(),
            ..BatchReport::default()
        };

        for entry in entries {
            if self.process_entry(entry).await {
                report.acked += 1;
            } else {
                report.left_pending += 1;
            }
        }

        report
    }

    /// Handle one entry. Returns true if it was acknowledged.
    async fn process_entry(&self, entry: StreamEntry) -> bool {
        let entry_id = entry.id.clone();
        let result = self
            .handler
            .handle(HandleDriftEventCommand {
                entry_id: entry.id,
                payload: entry.payload,
            })
            .await;

        match result {
            Ok(DriftOutcome::Skipped { user_id, reason }) => {
                tracing::debug!(entry_id = %entry_id, user_id = %user_id, reason = ?reason, "Drift event skipped");
            }
            Ok(DriftOutcome::Processed { user_id, outcome }) => {
                tracing::info!(
                    entry_id = %entry_id,
                    user_id = %user_id,
                    status = %outcome.status,
                    "Drift event processed"
                );
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(
                    entry_id = %entry_id,
                    code = %e.code(),
                    error = %e,
                    "Drift event failed, leaving unacknowledged for redelivery"
                );
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    entry_id = %entry_id,
                    code = %e.code(),
                    error = %e,
                    "Dropping unprocessable drift event"
                );
            }
        }

        match self.log.ack(&entry_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(entry_id = %entry_id, error = %e, "Failed to acknowledge drift event");
                false
            }
        }
    }
}
