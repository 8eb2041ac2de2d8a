//! Assignment domain module.
//!
//! Mode-aware commitment of a predefined profile to a user.
//!
//! # Module Structure
//!
//! - `mode` - ProfileMode, AssignmentStatus, ConfidenceLevel
//! - `policy` - AssignmentPolicy thresholds and decision rule
//! - `events` - DriftEvent (inbound) and ProfileAssigned (outbound)
//! - `errors` - AssignmentError

mod errors;
mod events;
mod mode;
mod policy;

pub use errors::AssignmentError;
pub use events::{DriftEvent, DriftSeverity, ProfileAssigned, ProfileAssignedPayload};
pub use mode::{AssignmentStatus, ConfidenceLevel, ProfileMode};
pub use policy::{AssignmentDecision, AssignmentPolicy};
