//! Health endpoint and API docs integration tests.

mod helpers;

use axum::http::StatusCode;
use helpers::fakes::FakeMediaTool;
use helpers::setup_test_app;
use serde_json::Value;

#[tokio::test]
async fn test_liveness() {
    let app = setup_test_app(FakeMediaTool::video(1920, 1080)).await;

    let response = app.client().get("/health/live").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_readiness_checks_database_and_storage() {
    let app = setup_test_app(FakeMediaTool::video(1920, 1080)).await;

    let response = app.client().get("/health/ready").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "ready");
    assert_eq!(body["storage"], "ready");
}

#[tokio::test]
async fn test_openapi_spec_is_served() {
    let app = setup_test_app(FakeMediaTool::video(1920, 1080)).await;

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let spec: Value = response.json();
    assert!(spec["paths"]["/api/video_upload/{video_id}"]["post"].is_object());
}
