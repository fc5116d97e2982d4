use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transmute_core::{
    config::CONFIG_PATH_ENV, config_path_from_env, load_config, validate_config,
    ConversionOrchestrator,
};
use transmute_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("transmute {} starting", VERSION);

    // Load configuration
    let config_path = config_path_from_env();
    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!(
            "{} not set, using defaults and environment overrides",
            CONFIG_PATH_ENV
        ),
    }
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Upload directory: {:?}", config.uploads.dir);

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {:?}",
                config.uploads.dir
            )
        })?;

    // Create orchestrator and probe the external engines
    let orchestrator = ConversionOrchestrator::from_config(&config.converter);
    let failures = orchestrator.validate().await;
    if failures.is_empty() {
        info!("All conversion engines available");
    }
    for (adapter, e) in &failures {
        warn!(
            "{} adapter unavailable, its conversions will fail: {}",
            adapter, e
        );
    }
    match config.converter.timeout() {
        Some(timeout) => info!("Conversion timeout: {}s", timeout.as_secs()),
        None => info!("Conversion timeout disabled"),
    }

    // Create app state and router
    let addr = config.server.socket_addr();
    let state = Arc::new(AppState::new(config, Arc::new(orchestrator)));
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
