//! Axum router configuration for ranking-state endpoints.

use axum::{routing::get, Router};

use super::super::state::AppState;
use super::handlers::{
    get_ranking_state, list_ranking_states, profile_drift, profile_history, purge_ranking_states,
    ranking_summary, top_profiles,
};

/// Create the ranking-state router, mounted at `/api/ranking-states`.
pub fn ranking_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user/:user_id",
            get(list_ranking_states).delete(purge_ranking_states),
        )
        .route("/user/:user_id/top-profiles", get(top_profiles))
        .route("/user/:user_id/stats", get(ranking_summary))
        .route("/user/:user_id/profile/:profile_id", get(get_ranking_state))
        .route(
            "/user/:user_id/profile/:profile_id/history",
            get(profile_history),
        )
        .route("/user/:user_id/profile/:profile_id/drift", get(profile_drift))
}
