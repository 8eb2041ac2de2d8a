//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers fold observations and commit assignments; query handlers
//! read ranking state and assignment status without mutating anything.

pub mod handlers;

pub use handlers::{
    // Assignment
    AssignProfileCommand, AssignProfileHandler, AssignmentOutcome, BehaviorInput,
    GetAssignmentStatusHandler, GetAssignmentStatusQuery,
    // Drift
    DriftHandlingError, DriftOutcome, HandleDriftEventCommand, HandleDriftEventHandler,
    SkipReason,
};
