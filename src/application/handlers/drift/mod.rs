//! Drift handlers.
//!
//! ## Commands
//! - Handling one inbound drift event

mod handle_drift_event;

pub use handle_drift_event::{
    DriftHandlingError, DriftOutcome, HandleDriftEventCommand, HandleDriftEventHandler, SkipReason,
};
