//! # Schema
//!
//! Creates the tables the service needs. Every statement is `IF NOT EXISTS`, so running
//! it against an initialized database is a no-op.

use super::{DbPool, POSTGRES_BACKEND};
use tracing::{debug, info};

const POSTGRES_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR NOT NULL UNIQUE
)
"#;

const SQLITE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE
)
"#;

/// Create the `users` table on the backend behind `pool`.
///
/// Borrows a single connection for the duration of the attempt. Errors are returned
/// as-is so the caller can tell transient connection failures from real ones.
pub async fn create_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let backend = conn.backend_name().to_string();
    debug!("Creating schema on {} backend", backend);

    let ddl = if backend == POSTGRES_BACKEND {
        POSTGRES_USERS_TABLE
    } else {
        SQLITE_USERS_TABLE
    };
    sqlx::query(ddl).execute(&mut *conn).await?;

    info!("Schema ready on {} backend", backend);
    Ok(())
}
