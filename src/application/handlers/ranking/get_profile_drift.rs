//! GetProfileDriftHandler - drift signal classification for one row.

use std::sync::Arc;

use crate::domain::foundation::{ProfileId, UserId};
use crate::domain::ranking::{DriftReport, RankingError, DEFAULT_DRIFT_RUN_THRESHOLD};
use crate::ports::RankingStateRepository;

/// Query for the drift report of one (user, profile) state.
#[derive(Debug, Clone)]
pub struct GetProfileDriftQuery {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub top_threshold: u32,
    pub drop_threshold: u32,
}

impl GetProfileDriftQuery {
    /// Query with the default run thresholds.
    pub fn new(user_id: UserId, profile_id: ProfileId) -> Self {
        Self {
            user_id,
            profile_id,
            top_threshold: DEFAULT_DRIFT_RUN_THRESHOLD,
            drop_threshold: DEFAULT_DRIFT_RUN_THRESHOLD,
        }
    }
}

pub struct GetProfileDriftHandler {
    repository: Arc<dyn RankingStateRepository>,
}

impl GetProfileDriftHandler {
    pub fn new(repository: Arc<dyn RankingStateRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetProfileDriftQuery) -> Result<DriftReport, RankingError> {
        if query.top_threshold == 0 {
            return Err(RankingError::validation("top_threshold", "must be at least 1"));
        }
        if query.drop_threshold == 0 {
            return Err(RankingError::validation("drop_threshold", "must be at least 1"));
        }

        let state = self
            .repository
            .find(&query.user_id, &query.profile_id)
            .await?
            .ok_or_else(|| RankingError::not_found(query.user_id, query.profile_id))?;

        Ok(DriftReport::analyze(
            &state,
            query.top_threshold,
            query.drop_threshold,
        ))
    }
}
