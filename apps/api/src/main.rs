//! Bazaar API server binary.
//!
//! Loads configuration, connects to SQLite, runs migrations, and serves
//! the router until SIGINT/SIGTERM.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use bazaar_api::routes::build_router;
use bazaar_api::{ApiConfig, AppState};
use bazaar_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    // RUST_LOG controls verbosity; default to info when unset.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting Bazaar API server...");

    // Load configuration
    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        database_path = %config.database_path,
        "Configuration loaded"
    );

    // Connect to database (runs migrations unless disabled)
    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Connected to SQLite");

    // Create shared state and router
    let addr = format!("0.0.0.0:{}", config.port);
    let state = Arc::new(AppState::new(db, config));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(?e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(?e, "Failed to install SIGTERM handler");
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
