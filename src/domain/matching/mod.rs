//! Matching domain module.
//!
//! Pure scoring of a behavior observation against the predefined profile
//! catalog.
//!
//! # Module Structure
//!
//! - `observation` - BehaviorObservation input vector
//! - `profile` - ProfileDefinition reference data
//! - `weights` - WeightConfiguration and factor weight sets
//! - `engine` - ProfileMatcher ranking and normalization

mod engine;
mod observation;
mod profile;
mod weights;

pub use engine::{
    FactorBreakdown, MatchResult, ProfileMatcher, ProfileScore, BEHAVIOR_LEVEL_MISMATCH_SCORE,
};
pub use observation::{BehaviorObservation, NEUTRAL_SCALAR};
pub use profile::{ensure_unique_profile_ids, ProfileDefinition, WeightedAssociation};
pub use weights::{MatchingFactor, WeightConfiguration, WeightRegime, WeightSet};
