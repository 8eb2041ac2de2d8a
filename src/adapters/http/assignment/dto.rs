//! Request and response DTOs for assignment endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::assignment::{AssignmentOutcome, BehaviorInput};
use crate::domain::assignment::{AssignmentStatus, ConfidenceLevel};
use crate::domain::foundation::Timestamp;
use crate::domain::matching::BehaviorObservation;
use crate::domain::ranking::RankingState;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// One observation or an ordered batch of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BehaviorPayload {
    Batch(Vec<BehaviorObservation>),
    Single(BehaviorObservation),
}

impl From<BehaviorPayload> for BehaviorInput {
    fn from(payload: BehaviorPayload) -> Self {
        match payload {
            BehaviorPayload::Batch(observations) => BehaviorInput::Batch(observations),
            BehaviorPayload::Single(observation) => BehaviorInput::Single(observation),
        }
    }
}

/// Body of `POST /api/profile-assignment/assign`.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignProfileRequest {
    pub user_id: String,
    /// Mode the caller believes the account is in.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub behavior: Option<BehaviorPayload>,
    #[serde(default)]
    pub trigger_event_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// One aggregated ranking row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingStateResponse {
    pub profile_id: String,
    pub average_score: f64,
    pub cumulative_score: f64,
    pub max_score: f64,
    pub observations: u32,
    pub last_rank: u32,
    pub consecutive_top_count: u32,
    pub consecutive_drop_count: u32,
    pub updated_at: Timestamp,
}

impl From<&RankingState> for RankingStateResponse {
    fn from(state: &RankingState) -> Self {
        Self {
            profile_id: state.profile_id.to_string(),
            average_score: state.average_score,
            cumulative_score: state.cumulative_score,
            max_score: state.max_score,
            observations: state.observation_count,
            last_rank: state.last_rank,
            consecutive_top_count: state.consecutive_top_count,
            consecutive_drop_count: state.consecutive_drop_count,
            updated_at: state.updated_at,
        }
    }
}

const UNKNOWN_MODE: &str = "UNKNOWN";

/// Body returned by both assignment endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub status: AssignmentStatus,
    pub confidence_level: ConfidenceLevel,
    /// Stored mode, or `UNKNOWN` when the user does not exist.
    pub mode: String,
    pub prompt_count: u32,
    pub assigned_profile_id: Option<String>,
    pub aggregated_rankings: Vec<RankingStateResponse>,
}

impl From<AssignmentOutcome> for AssignmentResponse {
    fn from(outcome: AssignmentOutcome) -> Self {
        Self {
            status: outcome.status,
            confidence_level: outcome.confidence_level,
            mode: outcome
                .mode
                .map_or(UNKNOWN_MODE, |m| m.as_str())
                .to_string(),
            prompt_count: outcome.prompt_count,
            assigned_profile_id: outcome.assigned_profile_id.map(|id| id.to_string()),
            aggregated_rankings: outcome
                .rankings
                .iter()
                .map(RankingStateResponse::from)
                .collect(),
        }
    }
}
