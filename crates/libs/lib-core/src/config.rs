//! # Application Configuration
//!
//! This module manages application configuration loaded from environment variables.
//! All configuration is validated on startup to fail fast if misconfigured.
//!
//! The configuration is built once by the server and handed to the components that
//! need it (database pool, lifecycle manager, router). Nothing reads it through a
//! global.
//!
//! ## Environment Files
//!
//! [`Config::load()`] reads `.env.<APP_ENV>` (`.env.production` when `APP_ENV` is unset)
//! and then `.env` before looking at the process environment. Variables already present in the
//! environment always win.
//!
//! ```rust,no_run
//! use lib_core::Config;
//!
//! let config = Config::load()?;
//! println!("listening on {}", config.bind_address());
//! # Ok::<(), lib_core::AppError>(())
//! ```

use crate::error::{AppError, Result};
use lib_utils::{
    get_env_list, get_env_opt, get_env_or, get_env_parse_or, validate_not_empty, validate_seconds, MAX_SECONDS,
};
use std::time::Duration;

/// Environment assumed when `APP_ENV` is not set.
pub const DEFAULT_APP_ENV: &str = "production";

/// Default database when `DATABASE_URL` is not set: a local SQLite file.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/users.db?mode=rwc";

/// Application configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Human readable service name, used in the welcome message
    pub project_name: String,

    /// Service version reported by `/health`
    pub version: String,

    /// Deployment environment name (`production`, `development`, ...)
    pub env: String,

    /// Interface to bind the HTTP listener to
    pub host: String,

    /// Port to bind the HTTP listener to
    pub port: u16,

    /// Database connection URL (`postgres://...` or `sqlite:...`)
    pub database_url: String,

    /// Maximum number of schema initialization attempts at startup
    pub db_max_retries: u32,

    /// First backoff delay between startup attempts, in seconds
    pub db_retry_base_delay: f64,

    /// Upper bound for the backoff delay, in seconds
    pub db_retry_max_delay: f64,

    /// Size of the connection pool
    pub db_max_connections: u32,

    /// How long a request waits for a pooled connection, in seconds
    pub db_acquire_timeout: f64,

    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,

    /// Log level filter (`trace`, `debug`, `info`, `warn`, `error`)
    pub log_level: String,

    /// Log output format (`json` or `text`)
    pub log_format: String,

    // Authentication settings. Loaded for completeness, not used by any route.
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub secret_key: Option<String>,
    pub frontend_url: String,
}

impl Config {
    /// Load `.env` files and then read the configuration from the environment.
    pub fn load() -> Result<Self> {
        // Missing files are fine.
        dotenvy::from_filename(env_file_name(get_env_opt("APP_ENV").as_deref())).ok();
        dotenvy::dotenv().ok();

        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            project_name: get_env_or("PROJECT_NAME", "Users Service"),
            version: get_env_or("VERSION", env!("CARGO_PKG_VERSION")),
            env: get_env_or("ENV", "production"),
            host: get_env_or("HOST", "0.0.0.0"),
            port: get_env_parse_or("PORT", 8000).map_err(config_err)?,
            database_url: get_env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            db_max_retries: get_env_parse_or("DB_MAX_RETRIES", 5).map_err(config_err)?,
            db_retry_base_delay: get_env_parse_or("DB_RETRY_BASE_DELAY", 1.0).map_err(config_err)?,
            db_retry_max_delay: get_env_parse_or("DB_RETRY_MAX_DELAY", 10.0).map_err(config_err)?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 10).map_err(config_err)?,
            db_acquire_timeout: get_env_parse_or("DB_ACQUIRE_TIMEOUT", 5.0).map_err(config_err)?,
            allowed_origins: get_env_list(
                "ALLOWED_ORIGINS",
                &["http://localhost", "http://localhost:8000"],
            ),
            log_level: get_env_or("LOG_LEVEL", "info").to_lowercase(),
            log_format: get_env_or("LOG_FORMAT", "text").to_lowercase(),
            google_client_id: get_env_opt("GOOGLE_CLIENT_ID"),
            google_client_secret: get_env_opt("GOOGLE_CLIENT_SECRET"),
            secret_key: get_env_opt("SECRET_KEY"),
            frontend_url: get_env_or("FRONTEND_URL", "http://localhost:8000"),
        })
    }

    /// Configuration for a given database with every other value at its default.
    ///
    /// Handy for tools and tests that only care about storage.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            project_name: "Users Service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            env: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: database_url.into(),
            db_max_retries: 5,
            db_retry_base_delay: 1.0,
            db_retry_max_delay: 10.0,
            db_max_connections: 10,
            db_acquire_timeout: 5.0,
            allowed_origins: vec!["http://localhost".to_string()],
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            google_client_id: None,
            google_client_secret: None,
            secret_key: None,
            frontend_url: "http://localhost:8000".to_string(),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        validate_not_empty(&self.database_url, "DATABASE_URL").map_err(AppError::Config)?;

        if self.db_max_retries < 1 {
            return Err(AppError::Config("DB_MAX_RETRIES must be at least 1".to_string()));
        }

        validate_seconds(self.db_retry_base_delay, "DB_RETRY_BASE_DELAY").map_err(AppError::Config)?;
        validate_seconds(self.db_retry_max_delay, "DB_RETRY_MAX_DELAY").map_err(AppError::Config)?;
        validate_seconds(self.db_acquire_timeout, "DB_ACQUIRE_TIMEOUT").map_err(AppError::Config)?;

        if self.db_retry_base_delay > self.db_retry_max_delay {
            return Err(AppError::Config(
                "DB_RETRY_BASE_DELAY must not exceed DB_RETRY_MAX_DELAY".to_string(),
            ));
        }

        if self.db_max_connections < 1 {
            return Err(AppError::Config("DB_MAX_CONNECTIONS must be at least 1".to_string()));
        }

        Ok(())
    }

    /// Whether the service runs in the production environment.
    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    /// `host:port` string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn retry_base_delay(&self) -> Duration {
        seconds(self.db_retry_base_delay)
    }

    pub fn retry_max_delay(&self) -> Duration {
        seconds(self.db_retry_max_delay)
    }

    pub fn acquire_timeout(&self) -> Duration {
        seconds(self.db_acquire_timeout)
    }
}

/// Seconds as a `Duration`, clamped to `0..=MAX_SECONDS` (NaN becomes zero).
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.clamp(0.0, MAX_SECONDS)).unwrap_or_default()
}

/// Environment-specific file read by [`Config::load`]: `.env.<APP_ENV>`, defaulting to
/// `.env.production`.
pub fn env_file_name(app_env: Option<&str>) -> String {
    format!(".env.{}", app_env.unwrap_or(DEFAULT_APP_ENV))
}

fn config_err(err: lib_utils::envs::Error) -> AppError {
    AppError::Config(err.to_string())
}

// endregion: --- Tests
