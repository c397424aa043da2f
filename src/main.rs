//! RipMarket Backend Service
//!
//! Main entry point for the RipMarket auction backend.
//! This service provides:
//! - HTTP/JSON API for auctions, bidding, and the category graph
//! - RipLimit ledger administration endpoints
//! - Background sweeper for auction lifecycle transitions

use ripmarket_backend::services::LifecycleSweeper;
use ripmarket_backend::{api, AppConfig, AppError, AppResult, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ripmarket_backend={}", config.log_level).into()),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║          RipMarket Backend Service Starting               ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    let http_port = config.http_port;
    let sweep_interval = config.sweep_interval();

    let app_state = AppState::new(config).map_err(|e| {
        error!("Failed to initialize application state: {}", e);
        e
    })?;
    info!("✓ Application state initialized with repositories");
    info!("✓ Audit trail service initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    info!("Starting background tasks...");

    let sweeper = LifecycleSweeper::new(app_state.auction_service.clone())
        .with_sweep_interval(sweep_interval);
    let sweeper_handle = tokio::spawn(async move {
        sweeper.start().await;
    });
    info!(
        "✓ Lifecycle sweeper started ({}s interval)",
        sweep_interval.as_secs()
    );

    // =========================================================================
    // START SERVER
    // =========================================================================
    let addr: SocketAddr = format!("0.0.0.0:{}", http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    info!("Starting HTTP server on {}...", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    let router = api::router(app_state);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("✓ HTTP server started on {}", addr);

    // =========================================================================
    // READY
    // =========================================================================
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║          RipMarket Backend Service Ready!                 ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = server_handle => {
            error!("HTTP server exited unexpectedly");
        }
        _ = sweeper_handle => {
            error!("Lifecycle sweeper exited unexpectedly");
        }
    }

    info!("RipMarket backend service shutdown complete");
    Ok(())
}
