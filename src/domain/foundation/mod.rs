//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, and error types that form the vocabulary of
//! the profile assignment domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ProfileId, UserId};
pub use timestamp::Timestamp;
