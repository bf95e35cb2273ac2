//! # Response Mapping Middleware
//!
//! Keeps error bodies uniform.
//!
//! Handler errors already render as `{"detail": "..."}` through `AppError`. Responses
//! produced by the router itself (`405 Method Not Allowed`, `415 Unsupported Media
//! Type` and friends) come back as plain text; this middleware rewrites those into the
//! same JSON shape using the status' canonical reason, keeping the other headers
//! (such as `Allow`) intact.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Response as HttpResponse},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use lib_core::dto::ErrorResponse;
use tracing::error;

pub async fn map_res(req: Request, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();

    if status.is_server_error() {
        error!("[RESPONSE] Server error: {}", status);
    }

    if !(status.is_client_error() || status.is_server_error()) || is_json(&res) {
        return res;
    }

    let detail = status.canonical_reason().unwrap_or("Error").to_string();
    let body = Json(ErrorResponse { detail }).into_response().into_body();

    let (mut parts, _) = res.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

    HttpResponse::from_parts(parts, body)
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}
