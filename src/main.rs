//! textdrop - Ephemeral Anonymous Text Sharing
//!
//! This is the main entry point for the textdrop server.
//! It reads the environment, connects to storage, starts the expiry sweeper
//! and serves HTTP until interrupted.

use anyhow::Context;
use std::sync::Arc;
use textdrop::config::Config;
use textdrop::http::{router, AppState};
use textdrop::storage::{ExpirySweeper, RetryPolicy, TextStore};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "textdrop=info".into()),
        )
        .with_target(false)
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    info!(version = textdrop::VERSION, "Starting textdrop");

    // Connect to storage (shared across all requests)
    let retry = RetryPolicy::default();
    let store = TextStore::connect_with_retry(config.store_config(), &retry)
        .await
        .context("could not connect to storage")?;
    let store = Arc::new(store);
    info!(database = %config.database_url, "Storage initialized");

    // Start the background expiry sweeper
    let sweeper = ExpirySweeper::start(Arc::clone(&store), config.expiry_config());

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("could not bind {}", config.bind_address()))?;
    info!("Listening on {}", config.bind_address());

    let app = router(AppState::new(Arc::clone(&store), config.static_dir.clone()));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    sweeper.shutdown().await;
    store.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, stopping server...");
}
