//! Redis Streams adapters.
//!
//! - `RedisDriftEventLog` - Consumer-group reads of the inbound drift stream
//! - `RedisAssignmentPublisher` - Appends to the outbound assignment stream

mod assignment_publisher;
mod drift_event_log;

pub use assignment_publisher::RedisAssignmentPublisher;
pub use drift_event_log::{RedisDriftEventLog, PAYLOAD_FIELD};

use redis::aio::MultiplexedConnection;

use crate::config::RedisConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Opens a multiplexed connection, bounded by the configured timeout.
pub async fn connect(config: &RedisConfig) -> Result<MultiplexedConnection, DomainError> {
    let client = redis::Client::open(config.url.as_str()).map_err(|e| {
        DomainError::new(ErrorCode::ConfigurationError, format!("Invalid Redis URL: {}", e))
    })?;

    tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| {
            DomainError::new(
                ErrorCode::StreamError,
                format!("Timed out connecting to Redis after {:?}", config.timeout()),
            )
        })?
        .map_err(|e| {
            DomainError::new(ErrorCode::StreamError, format!("Failed to connect to Redis: {}", e))
        })
}
