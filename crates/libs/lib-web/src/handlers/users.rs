//! # User Handlers
//!
//! HTTP request handlers for the `/users` resource. Each handler extracts its input,
//! delegates to [`UserService`], and returns JSON; failures are [`AppError`]s rendered
//! as `{"detail": ...}`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use lib_web::handlers::users;
//!
//! let app = Router::new()
//!     .route("/users/", get(users::list_users).post(users::create_user))
//!     .route("/users/{user_id}", get(users::get_user).put(users::update_user).delete(users::delete_user));
//! ```

use crate::extract::{AppPath, ValidatedJson};
use crate::services::UserService;
use axum::extract::{Json, State};
use lib_core::dto::{UserCreate, UserDelete, UserResponse};
use lib_core::AppError;
use tracing::{debug, instrument};

/// `POST /users/` - create a user.
#[instrument(skip(service, req), fields(email = %req.email))]
pub async fn create_user(
    State(service): State<UserService>,
    ValidatedJson(req): ValidatedJson<UserCreate>,
) -> Result<Json<UserResponse>, AppError> {
    debug!("[USERS] create");
    service.create(req).await.map(Json)
}

/// `GET /users/` - list all users.
#[instrument(skip(service))]
pub async fn list_users(State(service): State<UserService>) -> Result<Json<Vec<UserResponse>>, AppError> {
    service.list().await.map(Json)
}

/// `GET /users/{user_id}` - fetch one user.
#[instrument(skip(service))]
pub async fn get_user(
    State(service): State<UserService>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserResponse>, AppError> {
    service.get(user_id).await.map(Json)
}

/// `PUT /users/{user_id}` - replace a user's name and email.
#[instrument(skip(service, req), fields(email = %req.email))]
pub async fn update_user(
    State(service): State<UserService>,
    AppPath(user_id): AppPath<i64>,
    ValidatedJson(req): ValidatedJson<UserCreate>,
) -> Result<Json<UserResponse>, AppError> {
    debug!("[USERS] update");
    service.update(user_id, req).await.map(Json)
}

/// `DELETE /users/{user_id}` - delete a user.
#[instrument(skip(service))]
pub async fn delete_user(
    State(service): State<UserService>,
    AppPath(user_id): AppPath<i64>,
) -> Result<Json<UserDelete>, AppError> {
    service.delete(user_id).await.map(Json)
}

#[cfg(test)]
mod tests;
