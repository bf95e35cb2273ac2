//! # Services Layer
//!
//! This module contains business logic services that sit between the HTTP handlers
//! and the data layer:
//!
//! ```text
//! Handlers (HTTP) → Services (Business Logic) → Repository/Database
//! ```
//!
//! Services are cheap-to-clone structs holding their dependencies (the `DbPool`) and
//! return `Result<T, AppError>`, converting lower-level errors into the matching
//! `AppError` variant.

pub mod users;

pub use users::UserService;
