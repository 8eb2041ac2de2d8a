//! Commitment policy: when accumulated ranking evidence is strong enough to
//! persist an assignment.

use serde::{Deserialize, Serialize};

use super::mode::{ConfidenceLevel, ProfileMode};
use crate::domain::foundation::ProfileId;
use crate::domain::matching::WeightRegime;
use crate::domain::ranking::{best_ranked, RankingState};

/// Thresholds governing commitment and weight selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssignmentPolicy {
    /// Minimum observations before a cold-start commit.
    pub min_prompts_cold_start: u32,
    pub cold_start_threshold: f64,
    pub cold_start_min_top_count: u32,
    pub fallback_threshold: f64,
    pub fallback_min_top_count: u32,
    /// Averages strictly above this are reported as HIGH confidence.
    pub high_confidence_threshold: f64,
    /// Prompt numbers below this use cold-start weights in cold-start mode.
    pub bootstrap_window: u32,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            min_prompts_cold_start: 3,
            cold_start_threshold: 0.60,
            cold_start_min_top_count: 2,
            fallback_threshold: 0.70,
            fallback_min_top_count: 3,
            high_confidence_threshold: 0.70,
            bootstrap_window: 5,
        }
    }
}

/// Result of evaluating a user's ranking states.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentDecision {
    Commit {
        profile_id: ProfileId,
        confidence: ConfidenceLevel,
        average_score: f64,
    },
    Pending {
        leading_profile: Option<ProfileId>,
    },
}

impl AssignmentDecision {
    pub fn is_commit(&self) -> bool {
        matches!(self, AssignmentDecision::Commit { .. })
    }
}

impl AssignmentPolicy {
    /// Weight regime for the given 1-based prompt number.
    pub fn regime_for(&self, mode: ProfileMode, prompt_number: u32) -> WeightRegime {
        if mode == ProfileMode::ColdStart && prompt_number < self.bootstrap_window {
            WeightRegime::ColdStart
        } else {
            WeightRegime::Standard
        }
    }

    /// Confidence label for a committed profile's average score.
    pub fn confidence_for(&self, average_score: f64) -> ConfidenceLevel {
        if average_score > self.high_confidence_threshold {
            ConfidenceLevel::High
        } else {
            ConfidenceLevel::Medium
        }
    }

    /// Whether the strongest state clears the commitment bar for `mode`.
    pub fn clears_bar(&self, mode: ProfileMode, best: &RankingState) -> bool {
        match mode {
            ProfileMode::ColdStart => {
                best.observation_count >= self.min_prompts_cold_start
                    && best.average_score >= self.cold_start_threshold
                    && best.consecutive_top_count >= self.cold_start_min_top_count
            }
            ProfileMode::DriftFallback => {
                best.average_score >= self.fallback_threshold
                    && best.consecutive_top_count >= self.fallback_min_top_count
            }
            ProfileMode::Hybrid | ProfileMode::DynamicOnly => false,
        }
    }

    /// Evaluates the user's states and decides whether to commit.
    pub fn decide(&self, mode: ProfileMode, states: &[RankingState]) -> AssignmentDecision {
        match best_ranked(states) {
            Some(best) if self.clears_bar(mode, best) => AssignmentDecision::Commit {
                profile_id: best.profile_id.clone(),
                confidence: self.confidence_for(best.average_score),
                average_score: best.average_score,
            },
            best => AssignmentDecision::Pending {
                leading_profile: best.map(|s| s.profile_id.clone()),
            },
        }
    }
}
