//! # User Handler Tests
//!
//! Drives the full router (middleware included) against an in-memory SQLite database.

use crate::server::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use lib_core::{create_pool, create_schema, Config, DbPool};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Router and pool over a fresh in-memory database with the schema in place.
async fn test_app_with_pool() -> (Router, DbPool) {
    let config = Config::for_database("sqlite::memory:");
    let pool = create_pool(&config).expect("Failed to create test pool");
    create_schema(&pool).await.expect("Failed to create schema");
    (create_router(AppState::new(pool.clone(), config)), pool)
}

async fn test_app() -> Router {
    test_app_with_pool().await.0
}

async fn request(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let res = request(app, method, uri, body).await;
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn create(app: &Router, name: &str, email: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/users/",
        Some(json!({ "name": name, "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {body}");
    body
}

// ========== Create ==========

#[tokio::test]
async fn test_create_user() {
    let app = test_app().await;

    let body = create(&app, "Ada", "ada@example.com").await;

    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_create_duplicate_email_returns_400() {
    let app = test_app().await;
    create(&app, "Ada", "ada@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users/",
        Some(json!({ "name": "Other Ada", "email": "ada@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Email already registered" }));
}

#[tokio::test]
async fn test_create_invalid_email_returns_422() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/users/",
        Some(json!({ "name": "Ada", "email": "not-an-email" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn test_create_missing_field_returns_422() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::POST, "/users/", Some(json!({ "name": "Ada" }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_create_blank_name_returns_422() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/users/",
        Some(json!({ "name": "   ", "email": "ada@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ========== Read ==========

#[tokio::test]
async fn test_get_user() {
    let app = test_app().await;
    let created = create(&app, "Ada", "ada@example.com").await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::GET, &format!("/users/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);
}

#[tokio::test]
async fn test_get_missing_user_returns_404() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/users/999", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "User not found" }));
}

#[tokio::test]
async fn test_get_non_numeric_id_returns_422() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/users/abc", None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_list_users_in_creation_order() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/users/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    create(&app, "Ada", "ada@example.com").await;
    create(&app, "Grace", "grace@example.com").await;

    let (status, body) = send(&app, Method::GET, "/users", None).await;
    assert_eq!(status, StatusCode::OK);

    let emails: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["ada@example.com", "grace@example.com"]);
}

// ========== Update ==========

#[tokio::test]
async fn test_update_user() {
    let app = test_app().await;
    let id = create(&app, "Ada", "ada@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(json!({ "name": "Ada Lovelace", "email": "lovelace@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "id": id, "name": "Ada Lovelace", "email": "lovelace@example.com" })
    );

    let (_, fetched) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_update_keeping_own_email() {
    let app = test_app().await;
    let id = create(&app, "Ada", "ada@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(json!({ "name": "Countess", "email": "ada@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Countess");
}

#[tokio::test]
async fn test_update_to_taken_email_returns_400() {
    let app = test_app().await;
    create(&app, "Ada", "ada@example.com").await;
    let id = create(&app, "Grace", "grace@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/users/{id}"),
        Some(json!({ "name": "Grace", "email": "ada@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": "Email already registered" }));
}

#[tokio::test]
async fn test_update_missing_user_returns_404() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/users/42",
        Some(json!({ "name": "Nobody", "email": "nobody@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "User not found" }));
}

// ========== Delete ==========

#[tokio::test]
async fn test_delete_user() {
    let app = test_app().await;
    let id = create(&app, "Ada", "ada@example.com").await["id"].as_i64().unwrap();

    let (status, body) = send(&app, Method::DELETE, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "deleted": true }));

    let (status, _) = send(&app, Method::GET, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleted_email_can_be_reused() {
    let app = test_app().await;
    let id = create(&app, "Ada", "ada@example.com").await["id"].as_i64().unwrap();
    send(&app, Method::DELETE, &format!("/users/{id}"), None).await;

    let again = create(&app, "Ada", "ada@example.com").await;
    assert_ne!(again["id"].as_i64().unwrap(), id);
}

// ========== Storage failures ==========

#[tokio::test]
async fn test_closed_pool_returns_500() {
    let (app, pool) = test_app_with_pool().await;
    pool.close().await;

    let (status, body) = send(&app, Method::GET, "/users/", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "An internal error occurred" }));
}

#[tokio::test]
async fn test_failed_query_releases_session() {
    let (app, pool) = test_app_with_pool().await;
    create(&app, "Ada", "ada@example.com").await;
    sqlx::query("DROP TABLE users").execute(&pool).await.unwrap();

    let (status, body) = send(&app, Method::GET, "/users/", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "detail": "An internal error occurred" }));

    let (status, _) = send(
        &app,
        Method::POST,
        "/users/",
        Some(json!({ "name": "Grace", "email": "grace@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The single pooled connection came back both times: the next session works.
    create_schema(&pool).await.unwrap();
    let (status, body) = send(&app, Method::GET, "/users/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// ========== Service routes and middleware ==========

#[tokio::test]
async fn test_root_and_health() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Welcome to Users Service" }));

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::GET, "/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not Found" }));
}

#[tokio::test]
async fn test_wrong_method_returns_json_405() {
    let app = test_app().await;

    let (status, body) = send(&app, Method::PATCH, "/users/1", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "detail": "Method Not Allowed" }));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app().await;

    let first = request(&app, Method::GET, "/health", None).await;
    let second = request(&app, Method::GET, "/users/999", None).await;

    let first_id = first.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
    let second_id = second.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
    assert!(!first_id.is_empty());
    assert_ne!(first_id, second_id);
}
