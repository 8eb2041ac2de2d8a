//! HTTP client for the upstream behavior service.
//!
//! Fetches `GET {base_url}/api/behaviors/{user_id}/recent?limit=N` and
//! expects `{"behaviors": [Observation, ...]}` ordered oldest first.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::config::BehaviorServiceConfig;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::matching::BehaviorObservation;
use crate::ports::{BehaviorSourceError, RecentBehaviorSource};

/// Response body of the recent-behavior endpoint.
#[derive(Debug, Deserialize)]
struct RecentBehaviorsResponse {
    #[serde(default)]
    behaviors: Option<Vec<BehaviorObservation>>,
}

/// `RecentBehaviorSource` backed by the behavior service's REST API.
pub struct HttpBehaviorSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpBehaviorSource {
    /// Builds the client with the configured request timeout.
    pub fn new(config: &BehaviorServiceConfig) -> Result<Self, DomainError> {
        let timeout = config.timeout();
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to build behavior service client: {}", e),
            )
        })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn recent_url(&self, user_id: &UserId) -> String {
        format!("{}/api/behaviors/{}/recent", self.base_url, user_id)
    }

    fn map_send_error(&self, e: reqwest::Error) -> BehaviorSourceError {
        if e.is_timeout() {
            BehaviorSourceError::Timeout(self.timeout)
        } else if e.is_connect() {
            BehaviorSourceError::Unavailable(format!("connection failed: {}", e))
        } else {
            BehaviorSourceError::Unavailable(e.to_string())
        }
    }
}

/// Maps a non-success status to an error. 404 means the upstream has no
/// history for the user and is reported as `None` so callers see an empty
/// window.
fn check_status(status: StatusCode) -> Result<Option<()>, BehaviorSourceError> {
    match status.as_u16() {
        200..=299 => Ok(Some(())),
        404 => Ok(None),
        429 | 500..=599 => Err(BehaviorSourceError::Unavailable(format!(
            "status {}",
            status.as_u16()
        ))),
        other => Err(BehaviorSourceError::InvalidPayload(format!(
            "unexpected status {}",
            other
        ))),
    }
}

/// Decodes and shape-checks a response body.
fn decode_behaviors(body: &str) -> Result<Vec<BehaviorObservation>, BehaviorSourceError> {
    let response: RecentBehaviorsResponse = serde_json::from_str(body)
        .map_err(|e| BehaviorSourceError::InvalidPayload(e.to_string()))?;

    let behaviors = response.behaviors.unwrap_or_default();
    for (index, observation) in behaviors.iter().enumerate() {
        observation.validate().map_err(|e| {
            BehaviorSourceError::InvalidPayload(format!("behaviors[{}]: {}", index, e))
        })?;
    }
    Ok(behaviors)
}

#[async_trait]
impl RecentBehaviorSource for HttpBehaviorSource {
    async fn fetch_recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<BehaviorObservation>, BehaviorSourceError> {
        let response = self
            .client
            .get(self.recent_url(user_id))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if check_status(response.status())?.is_none() {
            tracing::debug!(user_id = %user_id, "Behavior service has no history for user");
            return Ok(Vec::new());
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let mut behaviors = decode_behaviors(&body)?;

        // Upstream may ignore the limit; keep the newest entries.
        let excess = behaviors.len().saturating_sub(limit as usize);
        behaviors.drain(..excess);

        tracing::debug!(user_id = %user_id, count = behaviors.len(), "Fetched recent behaviors");
        Ok(behaviors)
    }
}
