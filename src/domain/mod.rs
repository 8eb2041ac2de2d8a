//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `matching` - Weighted scoring of observations against the profile catalog
//! - `ranking` - Per-(user, profile) running statistics and drift analytics
//! - `assignment` - Modes, commitment policy, and assignment events

pub mod assignment;
pub mod foundation;
pub mod matching;
pub mod ranking;
