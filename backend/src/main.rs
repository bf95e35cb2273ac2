//! # Users Service
//!
//! Thin entry point that delegates to lib-web for server setup.
//!
//! Configuration comes from the environment (see `lib_core::Config`). Startup fails
//! with a non-zero exit code when the database cannot be reached.

use lib_web::start_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start_server().await
}
