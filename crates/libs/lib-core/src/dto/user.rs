//! # User Data Transfer Objects
//!
//! Request and response bodies for the `/users` endpoints.
//!
//! | Endpoint | Request | Response |
//! |---|---|---|
//! | `POST /users/` | [`UserCreate`] | [`UserResponse`] |
//! | `GET /users/` | - | `Vec<`[`UserResponse`]`>` |
//! | `GET /users/{id}` | - | [`UserResponse`] |
//! | `PUT /users/{id}` | [`UserCreate`] | [`UserResponse`] |
//! | `DELETE /users/{id}` | - | [`UserDelete`] |
//!
//! Errors use [`ErrorResponse`].
//!
//! ## Wire Format
//!
//! ```text
//! POST /users/
//! {"name": "Ada", "email": "ada@example.com"}
//!
//! 200 OK
//! {"id": 1, "name": "Ada", "email": "ada@example.com"}
//! ```

use crate::model::store::{User, UserForCreate, UserForUpdate};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Payload for creating a user. Updates take the same body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(custom(function = "validate_name"))]
    pub name: String,

    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
}

impl From<UserCreate> for UserForCreate {
    fn from(input: UserCreate) -> Self {
        UserForCreate::new(input.name, input.email)
    }
}

impl From<UserCreate> for UserForUpdate {
    fn from(input: UserCreate) -> Self {
        UserForUpdate::new(input.name, input.email)
    }
}

/// A user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Confirmation returned by a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDelete {
    pub id: i64,
    pub deleted: bool,
}

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    lib_utils::validate_not_empty(name, "name").map_err(|msg| {
        let mut err = ValidationError::new("blank");
        err.message = Some(msg.into());
        err
    })
}

// endregion: --- Tests
