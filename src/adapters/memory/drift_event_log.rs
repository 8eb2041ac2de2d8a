//! In-memory drift stream with consumer-group pending semantics.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{DriftEventLog, ReadCursor, StreamEntry};

/// Single-consumer stream model: `New` reads move entries to the pending
/// list, `ack` removes them, `Pending` reads return what is still pending.
/// A `New` read that finds nothing waits for the block interval before
/// returning, like a blocking stream read.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned.
pub struct InMemoryDriftEventLog {
    undelivered: Mutex<VecDeque<StreamEntry>>,
    pending: Mutex<Vec<StreamEntry>>,
    acked: Mutex<Vec<String>>,
    next_id: AtomicU64,
    batch_size: usize,
    block: Duration,
    failing: AtomicBool,
}

impl InMemoryDriftEventLog {
    pub fn new(batch_size: usize) -> Self {
        Self {
            undelivered: Mutex::new(VecDeque::new()),
            pending: Mutex::new(Vec::new()),
            acked: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            batch_size,
            block: Duration::from_millis(5),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_block(mut self, block: Duration) -> Self {
        self.block = block;
        self
    }

    /// Appends an entry carrying `payload`. Returns its id.
    pub fn push(&self, payload: impl Into<String>) -> String {
        self.push_entry(Some(payload.into()))
    }

    /// Appends an entry with no `payload` field.
    pub fn push_without_payload(&self) -> String {
        self.push_entry(None)
    }

    fn push_entry(&self, payload: Option<String>) -> String {
        let id = format!("{}-0", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.undelivered
            .lock()
            .expect("InMemoryDriftEventLog: lock poisoned")
            .push_back(StreamEntry {
                id: id.clone(),
                payload,
            });
        id
    }

    // === Test Helpers ===

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn acked(&self) -> Vec<String> {
        self.acked
            .lock()
            .expect("InMemoryDriftEventLog: lock poisoned")
            .clone()
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending
            .lock()
            .expect("InMemoryDriftEventLog: lock poisoned")
            .iter()
            .map(|e| e.id.clone())
            .collect()
    }

    pub fn undelivered_count(&self) -> usize {
        self.undelivered
            .lock()
            .expect("InMemoryDriftEventLog: lock poisoned")
            .len()
    }
}

#[async_trait]
impl DriftEventLog for InMemoryDriftEventLog {
    async fn ensure_group(&self) -> Result<(), DomainError> {
        Ok(())
    }

    async fn read_batch(&self, cursor: ReadCursor) -> Result<Vec<StreamEntry>, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(ErrorCode::StreamError, "stream unavailable"));
        }
        match cursor {
            ReadCursor::Pending => Ok(self
                .pending
                .lock()
                .expect("InMemoryDriftEventLog: lock poisoned")
                .iter()
                .take(self.batch_size)
                .cloned()
                .collect()),
            ReadCursor::New => {
                let batch: Vec<StreamEntry> = {
                    let mut undelivered = self
                        .undelivered
                        .lock()
                        .expect("InMemoryDriftEventLog: lock poisoned");
                    let take = self.batch_size.min(undelivered.len());
                    undelivered.drain(..take).collect()
                };
                if batch.is_empty() {
                    tokio::time::sleep(self.block).await;
                    return Ok(batch);
                }
                self.pending
                    .lock()
                    .expect("InMemoryDriftEventLog: lock poisoned")
                    .extend(batch.iter().cloned());
                Ok(batch)
            }
        }
    }

    async fn ack(&self, entry_id: &str) -> Result<(), DomainError> {
        self.pending
            .lock()
            .expect("InMemoryDriftEventLog: lock poisoned")
            .retain(|e| e.id != entry_id);
        self.acked
            .lock()
            .expect("InMemoryDriftEventLog: lock poisoned")
            .push(entry_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_reads_move_entries_to_pending_until_acked() {
        let log = InMemoryDriftEventLog::new(10);
        let a = log.push("{}");
        let b = log.push("{}");

        let batch = log.read_batch(ReadCursor::New).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(log.pending_ids(), vec![a.clone(), b.clone()]);

        log.ack(&a).await.unwrap();
        let pending = log.read_batch(ReadCursor::Pending).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b);
        assert!(log.read_batch(ReadCursor::New).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_size_bounds_reads() {
        let log = InMemoryDriftEventLog::new(2);
        for _ in 0..5 {
            log.push("{}");
        }
        assert_eq!(log.read_batch(ReadCursor::New).await.unwrap().len(), 2);
        assert_eq!(log.undelivered_count(), 3);
    }
}
