//! Ranking domain module.
//!
//! Temporal aggregation of per-prompt match results into one running
//! statistics record per (user, profile), plus read-only analytics.

mod analytics;
mod errors;
mod state;

pub use analytics::{
    DriftReport, DriftSignal, ProfileHistory, RankingSummary, ScoreTrend,
    DEFAULT_DRIFT_RUN_THRESHOLD, SCORE_DEGRADATION_THRESHOLD,
};
pub use errors::RankingError;
pub use state::{best_ranked, sort_best_first, RankingState};
