//! End-to-end tests of the HTTP API over in-memory stores and the seeded
//! profile catalog.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use profile_assignment::adapters::http::{app_router, AppState};
use profile_assignment::adapters::memory::{
    InMemoryAccountStore, InMemoryAssignmentPublisher, InMemoryProfileCatalog,
    InMemoryRankingStateRepository,
};
use profile_assignment::config::ServerConfig;
use profile_assignment::domain::assignment::AssignmentPolicy;

// =============================================================================
// Test Infrastructure
// =============================================================================

const COLD_USER: &str = "0b6f3c52-1e7d-4a8f-9c2b-5d4e6f7a8b90";
const FALLBACK_USER: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d";

struct TestApp {
    router: Router,
    publisher: Arc<InMemoryAssignmentPublisher>,
}

fn test_app() -> TestApp {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/seeds/profile_catalog.yaml");
    let catalog = InMemoryProfileCatalog::from_yaml_file(path).unwrap();

    let accounts_path = concat!(env!("CARGO_MANIFEST_DIR"), "/seeds/accounts.yaml");
    let accounts = Arc::new(InMemoryAccountStore::from_yaml_file(accounts_path).unwrap());
    let publisher = Arc::new(InMemoryAssignmentPublisher::new());

    let state = AppState::new(
        Arc::new(catalog),
        Arc::new(InMemoryRankingStateRepository::new()),
        accounts,
        publisher.clone(),
        AssignmentPolicy::default(),
    );

    TestApp {
        router: app_router(state, &ServerConfig::default()),
        publisher,
    }
}

fn builder_prompt() -> Value {
    json!({
        "intents": {"BUILDING": 0.9},
        "interests": {"PROGRAMMING": 0.8},
        "behavior_level": "INTERMEDIATE"
    })
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// =============================================================================
// Cold start
// =============================================================================

#[tokio::test]
async fn cold_start_prompts_commit_and_show_in_status_and_rankings() {
    let app = test_app();

    for prompt in 1..=2 {
        let (status, body) = call(
            &app.router,
            "POST",
            "/api/profile-assignment/assign",
            Some(json!({"user_id": COLD_USER, "behavior": builder_prompt()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["prompt_count"], prompt);
        assert_eq!(body["aggregated_rankings"][0]["profile_id"], "P2");
    }

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/profile-assignment/assign",
        Some(json!({"user_id": COLD_USER, "behavior": builder_prompt()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ASSIGNED");
    assert_eq!(body["assigned_profile_id"], "P2");
    assert_eq!(body["mode"], "COLD_START");
    assert_eq!(app.publisher.event_count(), 1);

    let uri = format!("/api/profile-assignment/{}/status", COLD_USER);
    let (status, body) = call(&app.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ASSIGNED");
    assert_eq!(body["assigned_profile_id"], "P2");
    assert_eq!(body["prompt_count"], 3);

    let uri = format!("/api/ranking-states/user/{}/stats", COLD_USER);
    let (status, body) = call(&app.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_ranked_profile_id"], "P2");
}

#[tokio::test]
async fn seeded_accounts_report_their_modes_before_any_prompt() {
    let app = test_app();

    let uri = format!("/api/profile-assignment/{}/status", FALLBACK_USER);
    let (status, body) = call(&app.router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["mode"], "DRIFT_FALLBACK");
}

#[tokio::test]
async fn cold_start_batch_is_rejected() {
    let app = test_app();
    let (status, body) = call(
        &app.router,
        "POST",
        "/api/profile-assignment/assign",
        Some(json!({
            "user_id": COLD_USER,
            "behavior": [builder_prompt(), builder_prompt()]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error_code"].is_string());

    let uri = format!("/api/ranking-states/user/{}", COLD_USER);
    let (_, body) = call(&app.router, "GET", &uri, None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

// =============================================================================
// Drift fallback over HTTP
// =============================================================================

#[tokio::test]
async fn fallback_batch_folds_every_observation() {
    let app = test_app();
    let batch: Vec<Value> = (0..5).map(|_| builder_prompt()).collect();

    let (status, body) = call(
        &app.router,
        "POST",
        "/api/profile-assignment/assign",
        Some(json!({
            "user_id": FALLBACK_USER,
            "mode": "DRIFT_FALLBACK",
            "behavior": batch,
            "trigger_event_id": "drift-evt-http"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prompt_count"], 5);
    assert_eq!(body["aggregated_rankings"][0]["profile_id"], "P2");
    assert_eq!(body["aggregated_rankings"][0]["observations"], 5);
}

// =============================================================================
// Housekeeping
// =============================================================================

#[tokio::test]
async fn purge_clears_rankings_and_health_is_up() {
    let app = test_app();
    call(
        &app.router,
        "POST",
        "/api/profile-assignment/assign",
        Some(json!({"user_id": COLD_USER, "behavior": builder_prompt()})),
    )
    .await;

    let uri = format!("/api/ranking-states/user/{}", COLD_USER);
    let (status, body) = call(&app.router, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 6);

    let (_, body) = call(&app.router, "GET", &uri, None).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let (status, body) = call(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["components"]["drift_consumer"], "disabled");
}
