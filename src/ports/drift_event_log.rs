//! DriftEventLog port - durable, consumer-group subscription to the
//! inbound drift stream.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Which part of the stream a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadCursor {
    /// Entries delivered to this consumer earlier but never acknowledged.
    Pending,
    /// Entries never delivered to any consumer of the group.
    New,
}

/// One raw entry read from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: String,
    /// Value of the entry's `payload` field, if present.
    pub payload: Option<String>,
}

/// Port for reading and acknowledging drift events.
///
/// Unacknowledged entries stay in the group's pending list and are returned
/// again by a `ReadCursor::Pending` read.
#[async_trait]
pub trait DriftEventLog: Send + Sync {
    /// Create the consumer group (and stream) if missing. Idempotent.
    async fn ensure_group(&self) -> Result<(), DomainError>;

    /// Read up to the configured batch size, blocking up to the configured
    /// timeout for `ReadCursor::New`.
    async fn read_batch(&self, cursor: ReadCursor) -> Result<Vec<StreamEntry>, DomainError>;

    /// Acknowledge one entry so it is never redelivered.
    async fn ack(&self, entry_id: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn DriftEventLog) {}
}
