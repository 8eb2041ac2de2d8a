//! Axum router configuration for assignment endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{assign_profile, get_assignment_status};

/// Create the assignment router, mounted at `/api/profile-assignment`.
///
/// # Routes
/// - `POST /assign` - Fold observations and maybe commit a profile
/// - `GET /:user_id/status` - Current assignment status
pub fn assignment_routes() -> Router<AppState> {
    Router::new()
        .route("/assign", post(assign_profile))
        .route("/:user_id/status", get(get_assignment_status))
}
