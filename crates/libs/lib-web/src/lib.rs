//! # Web Library
//!
//! HTTP layer of the users service: extractors, handlers, middleware, services,
//! the startup/shutdown lifecycle, and the server itself.

pub mod extract;
pub mod handlers;
pub mod lifecycle;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod services;

pub use lifecycle::{Lifecycle, LifecycleState, RetryPolicy, StartupError};
pub use server::{create_router, start_server, AppState};
