//! Assignment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | UserNotFound | 404 |
//! | ModeMismatch | 400 |
//! | ModeNotAssignable | 400 |
//! | InvalidShape | 400 |
//! | ValidationFailed | 400 |
//! | Ranking | 500 |
//! | Infrastructure | 500 |

use super::mode::ProfileMode;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::ranking::RankingError;

/// Errors returned by the assignment orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentError {
    /// No account exists for this user.
    UserNotFound(UserId),

    /// Caller-asserted mode differs from the stored mode.
    ModeMismatch {
        requested: ProfileMode,
        stored: ProfileMode,
    },

    /// Stored mode does not run predefined-profile assignment.
    ModeNotAssignable(ProfileMode),

    /// Observation count does not fit the mode.
    InvalidShape { mode: ProfileMode, reason: String },

    /// An observation or identifier failed validation.
    ValidationFailed { field: String, message: String },

    /// Folding into ranking state failed.
    Ranking(RankingError),

    /// Catalog, account store, or other infrastructure failure.
    Infrastructure(String),
}

impl AssignmentError {
    pub fn user_not_found(user_id: UserId) -> Self {
        AssignmentError::UserNotFound(user_id)
    }

    pub fn mode_mismatch(requested: ProfileMode, stored: ProfileMode) -> Self {
        AssignmentError::ModeMismatch { requested, stored }
    }

    pub fn mode_not_assignable(mode: ProfileMode) -> Self {
        AssignmentError::ModeNotAssignable(mode)
    }

    pub fn invalid_shape(mode: ProfileMode, reason: impl Into<String>) -> Self {
        AssignmentError::InvalidShape {
            mode,
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AssignmentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        AssignmentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AssignmentError::UserNotFound(_) => ErrorCode::UserNotFound,
            AssignmentError::ModeMismatch { .. } => ErrorCode::ModeMismatch,
            AssignmentError::ModeNotAssignable(_) => ErrorCode::ModeNotAssignable,
            AssignmentError::InvalidShape { .. } | AssignmentError::ValidationFailed { .. } => {
                ErrorCode::ValidationFailed
            }
            AssignmentError::Ranking(err) => err.code(),
            AssignmentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            AssignmentError::UserNotFound(user_id) => format!("User not found: {}", user_id),
            AssignmentError::ModeMismatch { requested, stored } => format!(
                "Requested mode {} does not match stored mode {}",
                requested, stored
            ),
            AssignmentError::ModeNotAssignable(mode) => {
                format!("Predefined profile assignment does not run in {} mode", mode)
            }
            AssignmentError::InvalidShape { mode, reason } => {
                format!("Invalid behavior payload for {}: {}", mode, reason)
            }
            AssignmentError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            AssignmentError::Ranking(err) => err.message(),
            AssignmentError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssignmentError::Ranking(err) => err.is_retryable(),
            AssignmentError::Infrastructure(_) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AssignmentError {}

impl From<RankingError> for AssignmentError {
    fn from(err: RankingError) -> Self {
        AssignmentError::Ranking(err)
    }
}

impl From<DomainError> for AssignmentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => AssignmentError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => AssignmentError::Infrastructure(err.to_string()),
        }
    }
}

impl From<AssignmentError> for DomainError {
    fn from(err: AssignmentError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}
