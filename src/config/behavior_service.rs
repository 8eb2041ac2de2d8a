//! Upstream behavior service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Where and how the recent-behavior window is fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct BehaviorServiceConfig {
    /// Base URL; `/api/behaviors/{user_id}/recent` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Size of the recent window requested on drift
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

impl BehaviorServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBehaviorServiceUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout("behavior_service.timeout_secs"));
        }
        if self.recent_limit == 0 || self.recent_limit > 100 {
            return Err(ValidationError::InvalidRecentLimit);
        }
        Ok(())
    }
}

impl Default for BehaviorServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_recent_limit() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BehaviorServiceConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.recent_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_url() {
        let config = BehaviorServiceConfig {
            base_url: "behavior-service:8001".to_string(),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidBehaviorServiceUrl));
    }

    #[test]
    fn rejects_zero_limit() {
        let config = BehaviorServiceConfig {
            recent_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRecentLimit));
    }
}
