//! # Validation Utilities
//!
//! Input validation helpers shared by request schemas and configuration.

/// Validate that a string is not empty (whitespace only counts as empty).
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Largest delay or timeout accepted from configuration: one day.
pub const MAX_SECONDS: f64 = 86_400.0;

/// Validate that a number of seconds is usable as a delay.
pub fn validate_seconds(value: f64, field_name: &str) -> Result<(), String> {
    if value.is_finite() && (0.0..=MAX_SECONDS).contains(&value) {
        Ok(())
    } else {
        Err(format!(
            "{} must be between 0 and {} seconds",
            field_name, MAX_SECONDS
        ))
    }
}
