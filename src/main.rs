//! DocHub Server: notification fan-out and live delivery
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use dochub_api::AppState;
use dochub_core::config::AppConfig;
use dochub_core::error::AppError;
use dochub_database::Stores;
use dochub_push::PushService;
use dochub_realtime::RealtimeEngine;
use dochub_worker::{RetentionSweeper, SweeperRunner};

#[tokio::main]
async fn main() {
    let env = std::env::var("DOCHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting DocHub v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Stores (database connection + migrations) ────────
    tracing::info!(provider = %config.database.provider, "Connecting stores...");
    let stores = Stores::connect(&config.database).await?;

    // ── Step 2: Push providers ───────────────────────────────────
    let push = PushService::from_config(&config.push, stores.push_tokens.clone())?;
    tracing::info!(enabled = push.is_enabled(), "Push service initialized");

    // ── Step 3: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Real-time engine (hub actor + dispatcher) ────────
    let realtime = RealtimeEngine::start(
        &config.realtime,
        &config.push,
        &stores,
        push,
        shutdown_rx.clone(),
    );

    // ── Step 5: Retention sweeper ────────────────────────────────
    let sweeper_handle = if config.retention.enabled {
        let sweeper = RetentionSweeper::new(
            stores.notifications.clone(),
            stores.activity.clone(),
            config.retention.horizon_days,
        );
        let runner = SweeperRunner::new(sweeper, &config.retention);
        let cancel = shutdown_rx.clone();
        Some(tokio::spawn(async move { runner.run(cancel).await }))
    } else {
        tracing::info!("Retention sweeper disabled");
        None
    };

    // ── Step 6: Build and start HTTP server ──────────────────────
    let state = AppState::new(Arc::clone(&config), stores.clone(), realtime.clone());
    let app = dochub_api::build_app(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "DocHub server listening");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    // Flipping the watch stops the hub, which closes every live socket so
    // the server can finish.
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 8: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background tasks to complete...");
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    if let Some(handle) = sweeper_handle {
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Retention sweeper did not stop in time");
        }
    }

    if !realtime.stop().await {
        tracing::warn!(
            remaining = realtime.push.in_flight(),
            "Push attempts abandoned at shutdown"
        );
    }

    stores.close().await;
    tracing::info!("DocHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
