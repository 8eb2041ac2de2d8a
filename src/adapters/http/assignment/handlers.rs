//! HTTP handlers for assignment endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::assignment::{
    AssignProfileCommand, BehaviorInput, GetAssignmentStatusQuery,
};
use crate::domain::assignment::{AssignmentStatus, ProfileMode};
use crate::domain::foundation::UserId;

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{AssignProfileRequest, AssignmentResponse};

/// POST /api/profile-assignment/assign - Fold observations and maybe commit
pub async fn assign_profile(
    State(state): State<AppState>,
    Json(request): Json<AssignProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::new(request.user_id)?;
    let requested_mode = request
        .mode
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(str::parse::<ProfileMode>)
        .transpose()?;
    let behavior: BehaviorInput = request
        .behavior
        .ok_or_else(|| ApiError::bad_request("behavior", "is required"))?
        .into();
    let trigger_event_id = request.trigger_event_id.filter(|id| !id.trim().is_empty());

    let handler = state.assign_profile_handler();
    let outcome = handler
        .handle(AssignProfileCommand {
            user_id,
            requested_mode,
            behavior,
            trigger_event_id,
        })
        .await?;

    Ok(Json(AssignmentResponse::from(outcome)))
}

/// GET /api/profile-assignment/:user_id/status - Current assignment status
///
/// Unknown users get 404 with a `NOT_FOUND` body in the normal shape.
pub async fn get_assignment_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::new(user_id)?;

    let handler = state.assignment_status_handler();
    let outcome = handler.handle(GetAssignmentStatusQuery { user_id }).await?;

    let status = if outcome.status == AssignmentStatus::NotFound {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    Ok((status, Json(AssignmentResponse::from(outcome))))
}
