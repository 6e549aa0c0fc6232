//! Auth Service
//!
//! Issues, validates, refreshes and revokes session tokens over HTTP.

use auth_service::config::Config;
use auth_service::observability::metrics::init_metrics_recorder;
use auth_service::repositories::{PgRevocationRepository, PgTeamRepository, PgUserRepository};
use auth_service::routes::{self, AppState};
use auth_service::tasks::{start_revocation_sweep, RevocationSweepConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Auth Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        access_token_ttl_seconds = config.access_token_ttl_seconds,
        refresh_token_ttl_seconds = config.refresh_token_ttl_seconds,
        secure_cookies = config.secure_cookies,
        "Configuration loaded successfully"
    );

    // Prometheus recorder must be installed before any metric is recorded
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database connection established");

    let bind_address = config.bind_address.clone();
    let sweep_interval = config.revocation_sweep_interval_seconds;

    let revocations = Arc::new(PgRevocationRepository::new(db_pool.clone()));
    let state = Arc::new(AppState::new(
        config,
        Arc::new(PgUserRepository::new(db_pool.clone())),
        revocations.clone(),
        Arc::new(PgTeamRepository::new(db_pool)),
    )?);

    let cancel_token = CancellationToken::new();
    let sweep_handle = match RevocationSweepConfig::from_interval(sweep_interval) {
        Some(sweep_config) => Some(tokio::spawn(start_revocation_sweep(
            revocations,
            sweep_config,
            cancel_token.clone(),
        ))),
        None => {
            info!("Revocation sweep disabled");
            None
        }
    };

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Auth Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel_token.cancel();
    if let Some(handle) = sweep_handle {
        if let Err(e) = handle.await {
            error!("Revocation sweep task failed: {}", e);
        }
    }

    info!("Auth Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
