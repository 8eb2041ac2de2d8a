//! Read-only analytics over a user's ranking states.

use serde::Serialize;

use super::state::{best_ranked, RankingState};
use crate::domain::foundation::{ProfileId, Timestamp, UserId};

/// Default run length that counts as a drift signal.
pub const DEFAULT_DRIFT_RUN_THRESHOLD: u32 = 3;

/// Average score under which a profile's fit is considered degraded.
pub const SCORE_DEGRADATION_THRESHOLD: f64 = 0.50;

/// Run length at which a trend is reported.
const TREND_RUN_THRESHOLD: u32 = 2;

/// Kind of drift signal visible in a single ranking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftSignal {
    ScoreDegradation,
    ConsistentTop,
    ConsistentDrop,
}

impl DriftSignal {
    pub fn recommendation(&self) -> &'static str {
        match self {
            DriftSignal::ScoreDegradation => {
                "Profile confidence has degraded significantly - consider fallback"
            }
            DriftSignal::ConsistentTop => "Consider switching to DYNAMIC_ONLY mode",
            DriftSignal::ConsistentDrop => "Consider activating fallback profile",
        }
    }
}

/// Drift analysis of one ranking state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriftReport {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub has_drift: bool,
    pub drift_type: Option<DriftSignal>,
    pub consecutive_top_count: u32,
    pub consecutive_drop_count: u32,
    pub recommendation: String,
}

impl DriftReport {
    /// Classifies the state. Checks run in priority order and the first
    /// match wins.
    pub fn analyze(state: &RankingState, top_threshold: u32, drop_threshold: u32) -> Self {
        let signal = if state.average_score < SCORE_DEGRADATION_THRESHOLD {
            Some(DriftSignal::ScoreDegradation)
        } else if state.consecutive_top_count >= top_threshold {
            Some(DriftSignal::ConsistentTop)
        } else if state.consecutive_drop_count >= drop_threshold {
            Some(DriftSignal::ConsistentDrop)
        } else {
            None
        };

        Self {
            user_id: state.user_id.clone(),
            profile_id: state.profile_id.clone(),
            has_drift: signal.is_some(),
            drift_type: signal,
            consecutive_top_count: state.consecutive_top_count,
            consecutive_drop_count: state.consecutive_drop_count,
            recommendation: signal
                .map(|s| s.recommendation())
                .unwrap_or("Continue monitoring")
                .to_string(),
        }
    }
}

/// Direction a profile's rank has been moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTrend {
    Improving,
    Declining,
    Stable,
}

/// Snapshot of one profile's rank history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileHistory {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub current_rank: u32,
    pub average_score: f64,
    pub score_trend: ScoreTrend,
    pub observation_count: u32,
    pub last_updated: Timestamp,
}

impl ProfileHistory {
    pub fn from_state(state: &RankingState) -> Self {
        let score_trend = if state.consecutive_top_count >= TREND_RUN_THRESHOLD {
            ScoreTrend::Improving
        } else if state.consecutive_drop_count >= TREND_RUN_THRESHOLD {
            ScoreTrend::Declining
        } else {
            ScoreTrend::Stable
        };

        Self {
            user_id: state.user_id.clone(),
            profile_id: state.profile_id.clone(),
            current_rank: state.last_rank,
            average_score: state.average_score,
            score_trend,
            observation_count: state.observation_count,
            last_updated: state.updated_at,
        }
    }
}

/// Aggregate view of all of a user's ranking states.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingSummary {
    pub user_id: UserId,
    pub total_profiles: usize,
    pub top_ranked_profile_id: Option<ProfileId>,
    pub highest_average_score: f64,
    pub total_observations: u64,
    pub profiles_with_drift: usize,
}

impl RankingSummary {
    pub fn from_states(user_id: UserId, states: &[RankingState]) -> Self {
        let best = best_ranked(states);
        let profiles_with_drift = states
            .iter()
            .filter(|s| {
                s.consecutive_top_count >= DEFAULT_DRIFT_RUN_THRESHOLD
                    || s.consecutive_drop_count >= DEFAULT_DRIFT_RUN_THRESHOLD
            })
            .count();

        Self {
            user_id,
            total_profiles: states.len(),
            top_ranked_profile_id: best.map(|s| s.profile_id.clone()),
            highest_average_score: best.map(|s| s.average_score).unwrap_or(0.0),
            total_observations: states.iter().map(|s| u64::from(s.observation_count)).sum(),
            profiles_with_drift,
        }
    }
}
