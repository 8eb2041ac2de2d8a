//! Assignment handlers.
//!
//! ## Commands
//! - Processing observations and committing a profile
//!
//! ## Queries
//! - Get a user's assignment status

mod assign_profile;
mod get_assignment_status;

// Commands
pub use assign_profile::{
    AssignProfileCommand, AssignProfileHandler, AssignmentOutcome, BehaviorInput,
};

// Queries
pub use get_assignment_status::{GetAssignmentStatusHandler, GetAssignmentStatusQuery};
