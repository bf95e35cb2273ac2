//! # Database Store
//!
//! Connection pool, scoped sessions, schema management, and the user repository.
//!
//! The pool is an sqlx `AnyPool`: PostgreSQL in production, SQLite for local runs
//! and tests. Every connection handed out by the pool has already been switched to
//! UTC by the `after_connect` hook.
//!
//! ## Sessions
//!
//! A [`DbSession`] is a database transaction borrowed from the pool for exactly one
//! request. Commit it to persist the work; dropping it without a commit rolls back and
//! returns the connection to the pool, on every exit path.
//!
//! ```rust,no_run
//! # use lib_core::model::store::{acquire_session, DbPool, UserRepository};
//! # async fn example(pool: &DbPool) -> lib_core::Result<()> {
//! let mut session = acquire_session(pool).await?;
//! let users = UserRepository::list(&mut session).await?;
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

// region: --- Modules
pub mod models;
pub mod schema;
pub mod user_repository;
// endregion: --- Modules

// region: --- Re-exports
pub use models::{User, UserForCreate, UserForUpdate};
pub use schema::create_schema;
pub use user_repository::UserRepository;
// endregion: --- Re-exports

// region: --- Types and Functions
use crate::config::Config;
use crate::error::Result;
use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyConnection, AnyPool, Transaction};
use tracing::{debug, info};

/// Type alias for the connection pool.
pub type DbPool = AnyPool;

/// A scoped unit of work against the database. See the module docs.
pub type DbSession = Transaction<'static, Any>;

/// Backend name reported by sqlx for PostgreSQL connections.
pub const POSTGRES_BACKEND: &str = "PostgreSQL";

/// Backend name reported by sqlx for SQLite connections.
pub const SQLITE_BACKEND: &str = "SQLite";

/// Create the connection pool described by `config`.
///
/// The pool connects lazily: no connection is opened here, so an unreachable database
/// surfaces on first use (the startup schema attempt) where it can be retried.
pub fn create_pool(config: &Config) -> Result<DbPool> {
    sqlx::any::install_default_drivers();

    let mut options = AnyPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(config.acquire_timeout())
        .after_connect(|conn, _meta| Box::pin(async move { apply_utc_timezone(conn).await }));

    let mut max_connections = config.db_max_connections;
    if is_sqlite(&config.database_url) {
        // SQLite allows one writer at a time and a deferred transaction cannot upgrade
        // its read lock while another writer holds the file: sessions queue on the pool.
        max_connections = 1;
        options = options.max_connections(1);
    }

    if is_in_memory_sqlite(&config.database_url) {
        // Each SQLite memory connection is its own database: keep exactly one alive.
        options = options
            .min_connections(0)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    let pool = options.connect_lazy(&config.database_url)?;
    info!("Database pool created (max {} connections)", max_connections);

    Ok(pool)
}

/// Begin a scoped session (transaction) on a pooled connection.
pub async fn acquire_session(pool: &DbPool) -> Result<DbSession> {
    let session = pool.begin().await?;
    debug!("Database session acquired");
    Ok(session)
}

/// Close the pool, waiting for checked-out connections to be returned.
pub async fn close_pool(pool: &DbPool) {
    pool.close().await;
    info!("Database pool closed");
}

/// Put a freshly opened connection into UTC.
///
/// SQLite has no session time zone and its date functions already work in UTC.
async fn apply_utc_timezone(conn: &mut AnyConnection) -> std::result::Result<(), sqlx::Error> {
    if conn.backend_name() == POSTGRES_BACKEND {
        sqlx::query("SET TIME ZONE 'UTC'").execute(&mut *conn).await?;
        debug!("Connection time zone set to UTC");
    }
    Ok(())
}

fn is_sqlite(database_url: &str) -> bool {
    database_url.starts_with("sqlite:")
}

fn is_in_memory_sqlite(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:")
        || (database_url.starts_with("sqlite:") && database_url.contains("mode=memory"))
}
// endregion: --- Types and Functions

// endregion: --- Tests
