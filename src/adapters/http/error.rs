//! Error response body and domain-error to HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::assignment::AssignmentError;
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::ranking::RankingError;

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Assignment(AssignmentError),
    Ranking(RankingError),
    /// Malformed path, query, or body field.
    BadRequest { field: String, message: String },
}

impl ApiError {
    pub fn bad_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            field: field.into(),
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Assignment(err) => match err {
                AssignmentError::UserNotFound(_) => StatusCode::NOT_FOUND,
                AssignmentError::ModeMismatch { .. }
                | AssignmentError::ModeNotAssignable(_)
                | AssignmentError::InvalidShape { .. }
                | AssignmentError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
                AssignmentError::Ranking(inner) => ranking_status(inner),
                AssignmentError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Ranking(err) => ranking_status(err),
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Assignment(AssignmentError::ValidationFailed { field, .. })
            | ApiError::Ranking(RankingError::ValidationFailed { field, .. }) => {
                ErrorResponse::with_details(
                    ErrorCode::ValidationFailed.to_string(),
                    self.message(),
                    serde_json::json!({ "field": field }),
                )
            }
            ApiError::Assignment(err) => ErrorResponse::new(err.code().to_string(), err.message()),
            ApiError::Ranking(err) => ErrorResponse::new(err.code().to_string(), err.message()),
            ApiError::BadRequest { field, message } => ErrorResponse::with_details(
                ErrorCode::ValidationFailed.to_string(),
                format!("Validation failed for '{}': {}", field, message),
                serde_json::json!({ "field": field }),
            ),
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Assignment(err) => err.message(),
            ApiError::Ranking(err) => err.message(),
            ApiError::BadRequest { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
        }
    }
}

fn ranking_status(err: &RankingError) -> StatusCode {
    match err {
        RankingError::NotFound { .. } => StatusCode::NOT_FOUND,
        RankingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        RankingError::FoldFailed { .. } | RankingError::Infrastructure(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        ApiError::Assignment(err)
    }
}

impl From<RankingError> for ApiError {
    fn from(err: RankingError) -> Self {
        ApiError::Ranking(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self.message(), "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assignment::ProfileMode;
    use crate::domain::foundation::{ProfileId, UserId};

    #[test]
    fn client_errors_map_to_4xx() {
        let user = UserId::new("u").unwrap();
        assert_eq!(
            ApiError::from(AssignmentError::user_not_found(user.clone())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(AssignmentError::mode_mismatch(
                ProfileMode::ColdStart,
                ProfileMode::DriftFallback
            ))
            .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RankingError::not_found(user, ProfileId::new("P1").unwrap())).status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn infrastructure_errors_map_to_500() {
        assert_eq!(
            ApiError::from(AssignmentError::infrastructure("db down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(AssignmentError::from(RankingError::fold_failed(vec![], "x"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_body_carries_field() {
        let body = ApiError::from(AssignmentError::validation("behavior[0].complexity", "bad"))
            .body();
        assert_eq!(body.error_code, "VALIDATION_FAILED");
        assert_eq!(
            body.details.unwrap()["field"],
            serde_json::json!("behavior[0].complexity")
        );
    }
}
