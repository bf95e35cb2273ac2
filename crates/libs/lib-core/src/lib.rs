//! # Core Library
//!
//! Configuration, error type, database store, and DTOs for the users service.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use model::store::{acquire_session, close_pool, create_pool, create_schema, DbPool, DbSession};
