//! RecentBehaviorSource port - fetches a user's most recent interpreted
//! observations from the upstream behavior service.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::matching::BehaviorObservation;

/// Failures fetching recent behaviors. Every variant fails closed: callers
/// never proceed with partial data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BehaviorSourceError {
    #[error("Behavior service timed out after {0:?}")]
    Timeout(Duration),

    #[error("Behavior service unavailable: {0}")]
    Unavailable(String),

    #[error("Behavior service returned an invalid payload: {0}")]
    InvalidPayload(String),
}

impl BehaviorSourceError {
    /// Timeouts and outages may clear up; a bad payload will not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BehaviorSourceError::Timeout(_) | BehaviorSourceError::Unavailable(_)
        )
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            BehaviorSourceError::Timeout(_) => ErrorCode::UpstreamTimeout,
            BehaviorSourceError::Unavailable(_) => ErrorCode::UpstreamUnavailable,
            BehaviorSourceError::InvalidPayload(_) => ErrorCode::InvalidUpstreamPayload,
        }
    }
}

impl From<BehaviorSourceError> for DomainError {
    fn from(err: BehaviorSourceError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Port for the upstream recent-behavior endpoint.
#[async_trait]
pub trait RecentBehaviorSource: Send + Sync {
    /// Fetch up to `limit` recent observations, oldest first.
    ///
    /// Implementations enforce their own timeout and shape-validate every
    /// returned observation.
    async fn fetch_recent(
        &self,
        user_id: &UserId,
        limit: u32,
    ) -> Result<Vec<BehaviorObservation>, BehaviorSourceError>;
}
