//! Redis Streams implementation of DriftEventLog.
//!
//! Entries are read through a consumer group, so each entry is delivered to
//! one consumer and stays in the group's pending list until acknowledged.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::streams::{StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;

use crate::config::StreamsConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{DriftEventLog, ReadCursor, StreamEntry};

/// Field carrying the JSON event body in every entry.
pub const PAYLOAD_FIELD: &str = "payload";

/// Consumer-group reader over the drift stream.
///
/// Give it a dedicated connection: blocking reads hold the connection for
/// up to `block_ms`.
#[derive(Clone)]
pub struct RedisDriftEventLog {
    conn: MultiplexedConnection,
    stream: String,
    group: String,
    consumer: String,
    batch_size: usize,
    block_ms: usize,
}

impl RedisDriftEventLog {
    pub fn new(conn: MultiplexedConnection, config: &StreamsConfig) -> Self {
        Self {
            conn,
            stream: config.drift_stream.clone(),
            group: config.consumer_group.clone(),
            consumer: config.consumer_name.clone(),
            batch_size: config.batch_size,
            block_ms: usize::try_from(config.block_ms).unwrap_or(usize::MAX),
        }
    }

    fn read_options(&self, cursor: ReadCursor) -> StreamReadOptions {
        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .count(self.batch_size);
        match cursor {
            // BLOCK 0 would wait forever; pending reads return immediately
            ReadCursor::Pending => options,
            ReadCursor::New => options.block(self.block_ms),
        }
    }
}

fn stream_error(action: &str, e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::StreamError, format!("Failed to {}: {}", action, e))
}

fn cursor_id(cursor: ReadCursor) -> &'static str {
    match cursor {
        ReadCursor::Pending => "0",
        ReadCursor::New => ">",
    }
}

fn entries_from(reply: StreamReadReply) -> Vec<StreamEntry> {
    reply
        .keys
        .into_iter()
        .flat_map(|key| key.ids)
        .map(|entry| StreamEntry {
            payload: entry.get::<String>(PAYLOAD_FIELD),
            id: entry.id,
        })
        .collect()
}

#[async_trait]
impl DriftEventLog for RedisDriftEventLog {
    async fn ensure_group(&self) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let created: Result<(), redis::RedisError> = conn
            .xgroup_create_mkstream(&self.stream, &self.group, "0")
            .await;

        match created {
            Ok(()) => {
                tracing::info!("Created consumer group {} on {}", self.group, self.stream);
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => {
                tracing::debug!("Consumer group already exists: {}", self.group);
                Ok(())
            }
            Err(e) => Err(stream_error("create consumer group", e)),
        }
    }

    async fn read_batch(&self, cursor: ReadCursor) -> Result<Vec<StreamEntry>, DomainError> {
        let mut conn = self.conn.clone();
        // A timed-out blocking read replies nil, which decodes as no keys
        let reply: Option<StreamReadReply> = conn
            .xread_options(&[&self.stream], &[cursor_id(cursor)], &self.read_options(cursor))
            .await
            .map_err(|e| stream_error("read drift stream", e))?;

        Ok(reply.map(entries_from).unwrap_or_default())
    }

    async fn ack(&self, entry_id: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn
            .xack(&self.stream, &self.group, &[entry_id])
            .await
            .map_err(|e| stream_error("acknowledge drift event", e))?;
        Ok(())
    }
}
