//! Stream configuration for the drift consumer and the assignment publisher

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Stream names, consumer-group identity, and read tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamsConfig {
    /// Run the drift consumer at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_drift_stream")]
    pub drift_stream: String,

    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,

    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// Maximum entries per read
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How long a read for new entries blocks, in milliseconds
    #[serde(default = "default_block_ms")]
    pub block_ms: u64,

    /// Pause after a failed read, in milliseconds
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// How often unacknowledged entries are re-read, in seconds
    #[serde(default = "default_pending_retry_secs")]
    pub pending_retry_secs: u64,

    #[serde(default = "default_assigned_stream")]
    pub assigned_stream: String,
}

impl StreamsConfig {
    pub fn block(&self) -> Duration {
        Duration::from_millis(self.block_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn pending_retry_interval(&self) -> Duration {
        Duration::from_secs(self.pending_retry_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("streams.drift_stream", &self.drift_stream),
            ("streams.consumer_group", &self.consumer_group),
            ("streams.consumer_name", &self.consumer_name),
            ("streams.assigned_stream", &self.assigned_stream),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyStreamSetting(name));
            }
        }
        if self.batch_size == 0 || self.batch_size > 1000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        if self.block_ms == 0 {
            return Err(ValidationError::InvalidTimeout("streams.block_ms"));
        }
        if self.pending_retry_secs == 0 {
            return Err(ValidationError::MustBePositive("streams.pending_retry_secs"));
        }
        Ok(())
    }
}

impl Default for StreamsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            drift_stream: default_drift_stream(),
            consumer_group: default_consumer_group(),
            consumer_name: default_consumer_name(),
            batch_size: default_batch_size(),
            block_ms: default_block_ms(),
            error_backoff_ms: default_error_backoff_ms(),
            pending_retry_secs: default_pending_retry_secs(),
            assigned_stream: default_assigned_stream(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_drift_stream() -> String {
    "drift.events".to_string()
}

fn default_consumer_group() -> String {
    "predefined-profile-service".to_string()
}

fn default_consumer_name() -> String {
    "profile-worker-1".to_string()
}

fn default_batch_size() -> usize {
    10
}

fn default_block_ms() -> u64 {
    5000
}

fn default_error_backoff_ms() -> u64 {
    2000
}

fn default_pending_retry_secs() -> u64 {
    30
}

fn default_assigned_stream() -> String {
    "profile.assigned".to_string()
}
