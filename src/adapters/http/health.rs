//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub drift_consumer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub components: ComponentStatus,
}

/// GET /health - Service and background component status
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components: ComponentStatus {
            drift_consumer: state.consumer.as_str().to_string(),
        },
    })
}
