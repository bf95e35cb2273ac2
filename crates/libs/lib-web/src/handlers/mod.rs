//! # HTTP Request Handlers
//!
//! Axum HTTP request handlers organized by feature domain. Handlers delegate business
//! logic to services in the [`crate::services`] module.
//!
//! ## Handler Modules
//!
//! - **[`users`]**: User CRUD endpoints
//!   - `POST /users/` - Create a user
//!   - `GET /users/` - List users
//!   - `GET /users/{user_id}` - Get a user
//!   - `PUT /users/{user_id}` - Update a user
//!   - `DELETE /users/{user_id}` - Delete a user
//!
//! - **[`root`]**: Service endpoints
//!   - `GET /` - Welcome message
//!   - `GET /health` - Health check
//!
//! ## Error Handling
//!
//! Handlers return `Result<Json<T>, AppError>`. `AppError` implements `IntoResponse`
//! and renders as `{"detail": "..."}` with the matching status code:
//!
//! ```text
//! 400 {"detail": "Email already registered"}
//! 404 {"detail": "User not found"}
//! 422 {"detail": "email: value is not a valid email address"}
//! ```
//!
//! ## Request/Response Flow
//!
//! ```text
//! Client Request
//!     ↓
//! CORS / Trace / Logging / Request stamp middleware
//!     ↓
//! Extractors (AppPath, ValidatedJson) - reject invalid input
//!     ↓
//! Handler → UserService → UserRepository (one session per request)
//!     ↓
//! Response (JSON serialization)
//! ```

pub mod root;
pub mod users;
