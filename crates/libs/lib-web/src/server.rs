//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! Startup order:
//!
//! 1. Load configuration (`.env.<APP_ENV>`, `.env`, process environment) and install logging
//! 2. Build the connection pool (lazy, nothing is dialed yet)
//! 3. Create the schema through [`Lifecycle::start`], retrying with backoff
//! 4. Bind the listener and serve until SIGINT/SIGTERM
//! 5. Close the pool through [`Lifecycle::shutdown`]
//!
//! If step 3 gives up the listener is never bound and the process exits with an error.

// region: --- Imports
use axum::extract::FromRef;
use axum::http::{header, HeaderValue, Method, Request};
use axum::{routing::get, Router};
use lib_core::{close_pool, create_pool, create_schema, Config, DbPool};
use std::path::Path;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::handlers;
use crate::lifecycle::{Lifecycle, RetryPolicy};
use crate::logging::{init_tracing, level_directive};
use crate::middleware::{log_requests, map_res, mw_req_stamp::request_id, stamp_req};
use crate::services::UserService;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub users: UserService,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            users: UserService::new(db.clone()),
            db,
            config,
        }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> Self {
        state.users.clone()
    }
}
// endregion: --- AppState

// region: --- Server Setup
/// Initialize and run the HTTP server until a shutdown signal arrives.
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - The database stays unreachable after every startup retry
/// - Schema creation fails with a non-retryable error
/// - Server binding fails
pub async fn start_server() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    info!(" {} STARTING", config.project_name.to_uppercase());
    info!(" Version: {} | Environment: {}", config.version, config.env);
    info!(" Log level: {}", level_directive(&config.log_level));

    ensure_sqlite_dir(&config.database_url)?;

    info!("Creating database pool...");
    let pool = create_pool(&config)?;

    let mut lifecycle = Lifecycle::new(RetryPolicy::from_config(&config));
    if let Err(err) = lifecycle.start(|| create_schema(&pool)).await {
        error!(error = %err, "Startup aborted");
        close_pool(&pool).await;
        return Err(err.into());
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), config);
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(err) => {
            lifecycle.shutdown(&pool).await;
            return Err(err.into());
        }
    };

    info!(" SERVER READY: http://{}", bind_address);
    log_server_info();

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    lifecycle.shutdown(&pool).await;
    info!(" Server stopped");

    served.map_err(Into::into)
}

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let allowed_origins = &state.config.allowed_origins;
    let allow_origin = if allowed_origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "http_request",
                request_id = %request_id(request),
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_failure(
            |error: tower_http::classify::ServerErrorsFailureClass,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                tracing::error!(
                    error = ?error,
                    latency_ms = latency.as_millis(),
                    "[HTTP FAILURE] Error: {:?}, Latency: {}ms",
                    error,
                    latency.as_millis()
                );
            },
        );

    info!("[ROUTE SETUP] Registering HTTP routes...");
    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health))
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{user_id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .fallback(handlers::root::not_found)
        .with_state(state)
        // Outermost first: CORS, request stamp, trace span, logging, error body mapping
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(axum::middleware::from_fn(stamp_req))
                .layer(trace)
                .layer(axum::middleware::from_fn(log_requests))
                .layer(axum::middleware::from_fn(map_res)),
        )
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// File path of a `sqlite:` URL, or `None` for other drivers and in-memory databases.
pub fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.trim_start_matches("//");
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}

/// Create the parent directory of a SQLite database file.
fn ensure_sqlite_dir(database_url: &str) -> std::io::Result<()> {
    let Some(db_path) = sqlite_file_path(database_url) else {
        return Ok(());
    };

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("Created database directory: {:?}", parent);
        }
    }
    info!("Database file will be at: {}", db_path);
    Ok(())
}

/// Log server information
fn log_server_info() {
    info!(" USERS:");
    info!("   • POST   /users/");
    info!("   • GET    /users/");
    info!("   • GET    /users/{{user_id}}");
    info!("   • PUT    /users/{{user_id}}");
    info!("   • DELETE /users/{{user_id}}");
    info!(" SERVICE:");
    info!("   • GET    /");
    info!("   • GET    /health");
}
// endregion: --- Server Setup
