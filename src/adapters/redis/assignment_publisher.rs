//! Redis Streams implementation of AssignmentPublisher.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::sync::Mutex;

use super::drift_event_log::PAYLOAD_FIELD;
use crate::config::RedisConfig;
use crate::domain::assignment::ProfileAssigned;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AssignmentPublisher;

/// Appends `profile.assigned` events as `{"payload": "<json>"}` entries.
///
/// The connection is opened on first publish and shared afterwards. Any
/// publish error drops it so the next publish reconnects.
pub struct RedisAssignmentPublisher {
    client: redis::Client,
    conn: Mutex<Option<MultiplexedConnection>>,
    stream: String,
    connect_timeout: Duration,
}

impl RedisAssignmentPublisher {
    /// Parses the URL only; no connection is made until the first publish.
    pub fn new(config: &RedisConfig, stream: impl Into<String>) -> Result<Self, DomainError> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            DomainError::new(
                ErrorCode::ConfigurationError,
                format!("Invalid Redis URL: {}", e),
            )
        })?;

        Ok(Self {
            client,
            conn: Mutex::new(None),
            stream: stream.into(),
            connect_timeout: config.timeout(),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, DomainError> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(
            self.connect_timeout,
            self.client.get_multiplexed_tokio_connection(),
        )
        .await
        .map_err(|_| {
            DomainError::new(
                ErrorCode::StreamError,
                format!("Timed out connecting to Redis after {:?}", self.connect_timeout),
            )
        })?
        .map_err(|e: redis::RedisError| {
            DomainError::new(ErrorCode::StreamError, format!("Failed to connect to Redis: {}", e))
        })?;

        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        *self.conn.lock().await = None;
    }
}

#[async_trait]
impl AssignmentPublisher for RedisAssignmentPublisher {
    async fn publish(&self, event: &ProfileAssigned) -> Result<String, DomainError> {
        let payload = serde_json::to_string(&event.to_payload()).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize assignment event: {}", e),
            )
        })?;

        let mut conn = self.connection().await?;
        let result: Result<String, redis::RedisError> = conn
            .xadd(&self.stream, "*", &[(PAYLOAD_FIELD, payload.as_str())])
            .await;

        match result {
            Ok(message_id) => Ok(message_id),
            Err(e) => {
                self.reset().await;
                Err(DomainError::new(
                    ErrorCode::StreamError,
                    format!("Failed to publish to {}: {}", self.stream, e),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url_without_connecting() {
        let config = RedisConfig {
            url: "not a url".to_string(),
            timeout_secs: 1,
        };
        let result = RedisAssignmentPublisher::new(&config, "profile.assigned");
        assert!(result.is_err());
    }

    #[test]
    fn construction_does_not_connect() {
        // Nothing listens here; construction must still succeed.
        let config = RedisConfig {
            url: "redis://127.0.0.1:1".to_string(),
            timeout_secs: 1,
        };
        assert!(RedisAssignmentPublisher::new(&config, "profile.assigned").is_ok());
    }
}
