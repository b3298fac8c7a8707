//! Health check handlers.

use crate::constants::{HEALTH_CHECK_STORAGE_KEY, READINESS_CHECK_TIMEOUT_SECS};
use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const READY: &str = "ready";

/// Run an async check with timeout; returns "ready", "timeout", or "not_ready: {error}".
async fn run_check<F, E>(timeout: Duration, f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => READY.to_string(),
        Ok(Err(e)) => format!("not_ready: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - database and storage reachable.
pub async fn readiness_check(state: Arc<AppState>) -> impl IntoResponse {
    let timeout = Duration::from_secs(READINESS_CHECK_TIMEOUT_SECS);

    let database = run_check(timeout, state.videos.ping()).await;
    let storage = run_check(timeout, async {
        state.storage.exists(HEALTH_CHECK_STORAGE_KEY).await.map(drop)
    })
    .await;

    let ready = database == READY && storage == READY;
    if !ready {
        tracing::error!(database = %database, storage = %storage, "Readiness check failed");
    }

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
            "storage": storage,
        })),
    )
}
