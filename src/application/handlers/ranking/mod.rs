//! Ranking-state handlers.
//!
//! ## Commands
//! - Purging a user's ranking states
//!
//! ## Queries
//! - List, top-N and single-row reads
//! - Per-user summary statistics
//! - Per-row drift report

mod get_profile_drift;
mod get_ranking_states;
mod get_ranking_summary;
mod purge_ranking_states;

// Commands
pub use purge_ranking_states::{
    PurgeRankingStatesCommand, PurgeRankingStatesHandler, PurgeRankingStatesResult,
};

// Queries
pub use get_profile_drift::{GetProfileDriftHandler, GetProfileDriftQuery};
pub use get_ranking_states::{
    GetRankingStateQuery, GetRankingStatesHandler, GetRankingStatesQuery, DEFAULT_TOP_LIMIT,
    MAX_TOP_LIMIT,
};
pub use get_ranking_summary::{GetRankingSummaryHandler, GetRankingSummaryQuery};
