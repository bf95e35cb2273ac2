//! # Utilities Library
//!
//! Shared utility functions for environment variables, time, and validation.

pub mod envs;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_list, get_env_opt, get_env_or, get_env_parse, get_env_parse_or};
pub use time::{format_time, now_utc};
pub use validation::{validate_not_empty, validate_seconds, MAX_SECONDS};
