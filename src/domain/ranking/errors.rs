//! Ranking-state error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | ValidationFailed | 400 |
//! | FoldFailed | 500 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, ProfileId, UserId};

/// Errors raised while folding or reading ranking states.
#[derive(Debug, Clone, PartialEq)]
pub enum RankingError {
    /// No state exists for this (user, profile) pair.
    NotFound { user_id: UserId, profile_id: ProfileId },

    /// Score or rank outside the accepted domain.
    ValidationFailed { field: String, message: String },

    /// A batch fold was rolled back; none of the listed profiles were folded.
    FoldFailed {
        failed_profiles: Vec<ProfileId>,
        reason: String,
    },

    /// Storage failure.
    Infrastructure(String),
}

impl RankingError {
    pub fn not_found(user_id: UserId, profile_id: ProfileId) -> Self {
        RankingError::NotFound {
            user_id,
            profile_id,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RankingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn fold_failed(failed_profiles: Vec<ProfileId>, reason: impl Into<String>) -> Self {
        RankingError::FoldFailed {
            failed_profiles,
            reason: reason.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        RankingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            RankingError::NotFound { .. } => ErrorCode::RankingStateNotFound,
            RankingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            RankingError::FoldFailed { .. } | RankingError::Infrastructure(_) => {
                ErrorCode::DatabaseError
            }
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            RankingError::NotFound {
                user_id,
                profile_id,
            } => format!(
                "No ranking state found for user {} and profile {}",
                user_id, profile_id
            ),
            RankingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            RankingError::FoldFailed {
                failed_profiles,
                reason,
            } => {
                let ids: Vec<&str> = failed_profiles.iter().map(|p| p.as_str()).collect();
                format!("Ranking fold failed for [{}]: {}", ids.join(", "), reason)
            }
            RankingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RankingError::FoldFailed { .. } | RankingError::Infrastructure(_)
        )
    }
}

impl std::fmt::Display for RankingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RankingError {}

impl From<DomainError> for RankingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => RankingError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            _ => RankingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<RankingError> for DomainError {
    fn from(err: RankingError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match &err {
            RankingError::FoldFailed {
                failed_profiles, ..
            } => {
                let ids: Vec<&str> = failed_profiles.iter().map(|p| p.as_str()).collect();
                domain.with_detail("failed_profiles", ids.join(","))
            }
            RankingError::ValidationFailed { field, .. } => domain.with_detail("field", field.clone()),
            _ => domain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> ProfileId {
        ProfileId::new(s).unwrap()
    }

    #[test]
    fn not_found_maps_to_ranking_state_code() {
        let err = RankingError::not_found(UserId::new("u").unwrap(), pid("P1"));
        assert_eq!(err.code(), ErrorCode::RankingStateNotFound);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "No ranking state found for user u and profile P1");
    }

    #[test]
    fn fold_failure_lists_profiles_and_is_retryable() {
        let err = RankingError::fold_failed(vec![pid("P1"), pid("P2")], "deadlock");
        assert!(err.is_retryable());
        let domain: DomainError = err.into();
        assert_eq!(domain.code, ErrorCode::DatabaseError);
        assert_eq!(domain.details.get("failed_profiles"), Some(&"P1,P2".to_string()));
    }

    #[test]
    fn domain_validation_error_keeps_field() {
        let err: RankingError = DomainError::validation("score", "must be finite").into();
        assert_eq!(
            err,
            RankingError::ValidationFailed {
                field: "score".to_string(),
                message: "must be finite".to_string()
            }
        );
    }

    #[test]
    fn other_domain_errors_become_infrastructure() {
        let err: RankingError = DomainError::new(ErrorCode::DatabaseError, "down").into();
        assert!(matches!(err, RankingError::Infrastructure(_)));
    }
}
