//! # Application Lifecycle
//!
//! Startup and shutdown of the database side of the service.
//!
//! ```text
//! Starting → SchemaInitInProgress → Ready → ShuttingDown → Stopped
//!                 ↑          │
//!                 └─ backoff ┘ (transient failure, attempts left)
//! ```
//!
//! Startup runs the schema initialization until it succeeds, retrying transient
//! connection failures with exponential backoff:
//!
//! ```text
//! delay(attempt) = min(base_delay * 2^attempt, max_delay)     attempt = 0, 1, 2, ...
//! ```
//!
//! With the defaults (5 attempts, 1s base, 10s cap) a database that never comes up is
//! tried 5 times with 1s, 2s, 4s and 8s pauses in between, then startup fails and the
//! server never binds its listener. A failure that is not transient (bad SQL, bad
//! credentials, bad URL) fails startup at once.
//!
//! Shutdown closes the pool, bounded by a timeout so a stuck connection cannot hold
//! the process forever.

use lib_core::{close_pool, Config, DbPool};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

/// Default bound on closing the pool at shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// SQLite result codes that mean "try again later".
const SQLITE_BUSY: &str = "5";
const SQLITE_CANTOPEN: &str = "14";

// region:    --- State

/// Where the service is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    SchemaInitInProgress,
    Ready,
    ShuttingDown,
    Stopped,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Starting => write!(f, "starting"),
            LifecycleState::SchemaInitInProgress => write!(f, "schema_init_in_progress"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::ShuttingDown => write!(f, "shutting_down"),
            LifecycleState::Stopped => write!(f, "stopped"),
        }
    }
}

// endregion: --- State

// region:    --- Retry Policy

/// Bounded exponential backoff for startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of tries, including the first one
    pub max_attempts: u32,
    /// Pause after the first failure
    pub base_delay: Duration,
    /// Upper bound for any pause
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.db_max_retries,
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        }
    }

    /// Pause after failed attempt number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

// endregion: --- Retry Policy

// region:    --- Errors

/// Why startup gave up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Database connection failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database initialization failed: {0}")]
    Fatal(#[source] sqlx::Error),
}

/// Whether a failure is worth retrying: the database is unreachable or not ready yet.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| {
            // SQLSTATE class 08 = connection exception, 57P03 = cannot connect now
            code.starts_with("08") || code == "57P03" || code == SQLITE_BUSY || code == SQLITE_CANTOPEN
        }),
        _ => false,
    }
}

// endregion: --- Errors

// region:    --- Lifecycle

/// Drives the service through [`LifecycleState`].
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
    policy: RetryPolicy,
    attempts: u32,
    shutdown_timeout: Duration,
}

impl Lifecycle {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: LifecycleState::Starting,
            policy,
            attempts: 0,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_shutdown_timeout(mut self, shutdown_timeout: Duration) -> Self {
        self.shutdown_timeout = shutdown_timeout;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Number of initialization attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `init` until it succeeds or the retry budget is spent.
    ///
    /// Returns the number of attempts it took. On error the lifecycle ends in
    /// [`LifecycleState::Stopped`] and the caller must not serve requests.
    pub async fn start<F, Fut>(&mut self, mut init: F) -> Result<u32, StartupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), sqlx::Error>>,
    {
        info!("Starting up... Running database schema initialization");
        self.transition(LifecycleState::SchemaInitInProgress);

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt: u32 = 0;

        loop {
            self.attempts = attempt + 1;

            let err = match init().await {
                Ok(()) => {
                    info!(attempts = self.attempts, "Database schema initialization completed successfully");
                    self.transition(LifecycleState::Ready);
                    return Ok(self.attempts);
                }
                Err(err) => err,
            };

            if !is_transient(&err) {
                error!(error = %err, attempt = self.attempts, "Database initialization failed with a non-retryable error");
                self.transition(LifecycleState::Stopped);
                return Err(StartupError::Fatal(err));
            }

            let retries_left = max_attempts - self.attempts;
            if retries_left == 0 {
                error!(
                    error = %err,
                    attempts = self.attempts,
                    "Failed to connect to the database after {} attempts",
                    self.attempts
                );
                self.transition(LifecycleState::Stopped);
                return Err(StartupError::RetriesExhausted {
                    attempts: self.attempts,
                    source: err,
                });
            }

            let delay = self.policy.delay_for(attempt);
            warn!(
                error = %err,
                attempt = self.attempts,
                retries_left,
                delay_secs = delay.as_secs_f64(),
                "Database connection failed. Retrying in {:.1} seconds... ({} retries left)",
                delay.as_secs_f64(),
                retries_left
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    /// Release every pooled connection and stop.
    pub async fn shutdown(&mut self, pool: &DbPool) {
        info!("Shutting down... Closing database connections");
        self.transition(LifecycleState::ShuttingDown);

        if timeout(self.shutdown_timeout, close_pool(pool)).await.is_err() {
            warn!(
                timeout_secs = self.shutdown_timeout.as_secs_f64(),
                "Timed out waiting for database connections to close"
            );
        }

        self.transition(LifecycleState::Stopped);
    }

    fn transition(&mut self, next: LifecycleState) {
        info!(from = %self.state, to = %next, "[LIFECYCLE] {} -> {}", self.state, next);
        self.state = next;
    }
}

// endregion: --- Lifecycle
