//! # Root Handlers
//!
//! Welcome message, health check, and the JSON 404 fallback.

use axum::extract::{Json, State};
use axum::http::{StatusCode, Uri};
use lib_core::dto::{ErrorResponse, RootResponse};
use lib_core::Config;
use lib_utils::{format_time, now_utc};
use serde::Serialize;
use tracing::info;

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub timestamp: String,
}

/// `GET /` - welcome message.
pub async fn root(State(config): State<Config>) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("Welcome to {}", config.project_name),
    })
}

/// `GET /health` - liveness probe. Only reachable once startup finished.
pub async fn health(State(config): State<Config>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: config.version,
        timestamp: format_time(now_utc()),
    })
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    info!("[404 HANDLER] Unmatched route {} - returning 404", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            detail: "Not Found".to_string(),
        }),
    )
}
