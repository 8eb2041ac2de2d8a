//! HTTP handlers for ranking-state endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;

use crate::application::handlers::ranking::{
    GetProfileDriftQuery, GetRankingStateQuery, GetRankingStatesQuery, GetRankingSummaryQuery,
    PurgeRankingStatesCommand, DEFAULT_TOP_LIMIT,
};
use crate::domain::foundation::{ProfileId, UserId};
use crate::domain::ranking::ProfileHistory;

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{DriftParams, PurgeResponse, RankingStateView, TopProfilesParams};

fn ids(user_id: String, profile_id: String) -> Result<(UserId, ProfileId), ApiError> {
    Ok((UserId::new(user_id)?, ProfileId::new(profile_id)?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/ranking-states/user/:user_id
pub async fn list_ranking_states(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetRankingStatesQuery {
        user_id: UserId::new(user_id)?,
        limit: None,
    };
    let states = state.ranking_states_handler().handle(query).await?;
    Ok(Json(
        states.iter().map(RankingStateView::from).collect::<Vec<_>>(),
    ))
}

/// GET /api/ranking-states/user/:user_id/top-profiles?limit=
pub async fn top_profiles(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<TopProfilesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetRankingStatesQuery {
        user_id: UserId::new(user_id)?,
        limit: Some(params.limit.unwrap_or(DEFAULT_TOP_LIMIT)),
    };
    let states = state.ranking_states_handler().handle(query).await?;
    Ok(Json(
        states.iter().map(RankingStateView::from).collect::<Vec<_>>(),
    ))
}

/// GET /api/ranking-states/user/:user_id/stats
pub async fn ranking_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let query = GetRankingSummaryQuery {
        user_id: UserId::new(user_id)?,
    };
    let summary = state.ranking_summary_handler().handle(query).await?;
    Ok(Json(summary))
}

/// GET /api/ranking-states/user/:user_id/profile/:profile_id
pub async fn get_ranking_state(
    State(state): State<AppState>,
    Path((user_id, profile_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, profile_id) = ids(user_id, profile_id)?;
    let row = state
        .ranking_states_handler()
        .handle_one(GetRankingStateQuery {
            user_id,
            profile_id,
        })
        .await?;
    Ok(Json(RankingStateView::from(&row)))
}

/// GET /api/ranking-states/user/:user_id/profile/:profile_id/history
pub async fn profile_history(
    State(state): State<AppState>,
    Path((user_id, profile_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, profile_id) = ids(user_id, profile_id)?;
    let row = state
        .ranking_states_handler()
        .handle_one(GetRankingStateQuery {
            user_id,
            profile_id,
        })
        .await?;
    Ok(Json(ProfileHistory::from_state(&row)))
}

/// GET /api/ranking-states/user/:user_id/profile/:profile_id/drift
pub async fn profile_drift(
    State(state): State<AppState>,
    Path((user_id, profile_id)): Path<(String, String)>,
    Query(params): Query<DriftParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (user_id, profile_id) = ids(user_id, profile_id)?;
    let mut query = GetProfileDriftQuery::new(user_id, profile_id);
    if let Some(top) = params.top_threshold {
        query.top_threshold = top;
    }
    if let Some(drop) = params.drop_threshold {
        query.drop_threshold = drop;
    }

    let report = state.profile_drift_handler().handle(query).await?;
    Ok(Json(report))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// DELETE /api/ranking-states/user/:user_id
pub async fn purge_ranking_states(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = UserId::new(user_id)?;
    let deleted = state
        .purge_handler()
        .handle(PurgeRankingStatesCommand {
            user_id: user_id.clone(),
        })
        .await?;
    Ok(Json(PurgeResponse {
        user_id: user_id.to_string(),
        deleted,
    }))
}
