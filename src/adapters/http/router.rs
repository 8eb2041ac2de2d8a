//! Top-level router and middleware stack.

use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::assignment::assignment_routes;
use super::health::health;
use super::ranking::ranking_routes;
use super::state::AppState;
use crate::config::ServerConfig;

/// All routes, without middleware.
///
/// # Routes
/// - `GET /health`
/// - `/api/profile-assignment/*`
/// - `/api/ranking-states/*`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/profile-assignment", assignment_routes())
        .nest("/api/ranking-states", ranking_routes())
}

/// Routes plus tracing, CORS, and the request timeout.
pub fn app_router(state: AppState, server: &ServerConfig) -> Router {
    api_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(server))
        .layer(TimeoutLayer::new(server.request_timeout()))
        .with_state(state)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
