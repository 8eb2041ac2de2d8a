//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod assignment;
pub mod drift;
pub mod ranking;

pub use assignment::{
    AssignProfileCommand, AssignProfileHandler, AssignmentOutcome, BehaviorInput,
    GetAssignmentStatusHandler, GetAssignmentStatusQuery,
};
pub use drift::{
    DriftHandlingError, DriftOutcome, HandleDriftEventCommand, HandleDriftEventHandler, SkipReason,
};
pub use ranking::{
    GetProfileDriftHandler, GetProfileDriftQuery, GetRankingStateQuery, GetRankingStatesHandler,
    GetRankingStatesQuery, GetRankingSummaryHandler, GetRankingSummaryQuery,
    PurgeRankingStatesCommand, PurgeRankingStatesHandler, PurgeRankingStatesResult,
    DEFAULT_TOP_LIMIT, MAX_TOP_LIMIT,
};
