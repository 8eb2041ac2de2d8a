//! DTOs for ranking-state endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::ranking::RankingState;

/// One ranking state including its user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingStateView {
    pub user_id: String,
    pub profile_id: String,
    pub cumulative_score: f64,
    pub average_score: f64,
    pub max_score: f64,
    pub observation_count: u32,
    pub last_rank: u32,
    pub consecutive_top_count: u32,
    pub consecutive_drop_count: u32,
    pub updated_at: Timestamp,
}

impl From<&RankingState> for RankingStateView {
    fn from(state: &RankingState) -> Self {
        Self {
            user_id: state.user_id.to_string(),
            profile_id: state.profile_id.to_string(),
            cumulative_score: state.cumulative_score,
            average_score: state.average_score,
            max_score: state.max_score,
            observation_count: state.observation_count,
            last_rank: state.last_rank,
            consecutive_top_count: state.consecutive_top_count,
            consecutive_drop_count: state.consecutive_drop_count,
            updated_at: state.updated_at,
        }
    }
}

/// Query string of the top-profiles endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopProfilesParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string of the drift endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DriftParams {
    #[serde(default)]
    pub top_threshold: Option<u32>,
    #[serde(default)]
    pub drop_threshold: Option<u32>,
}

/// Body returned by the purge endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub user_id: String,
    pub deleted: u64,
}
