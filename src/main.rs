// Main entry point - Dependency injection and server setup
use anyhow::Context;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

use health_history::application::fetch_orchestrator::FetchOrchestrator;
use health_history::application::history_session::SessionRegistry;
use health_history::infrastructure::config::load_app_config;
use health_history::infrastructure::http_repository::HttpHistoryRepository;
use health_history::presentation::app_state::AppState;
use health_history::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_app_config().context("Failed to load config/history")?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpHistoryRepository::new(
        config.api.base_url.clone(),
        Duration::from_secs(config.api.timeout_secs),
    )?);

    // Create services (application layer)
    let orchestrator = FetchOrchestrator::new(repository);
    let sessions = SessionRegistry::new(orchestrator, config.history.default_period);

    // Create application state
    let state = Arc::new(AppState { sessions });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!(
        "Starting health-history service on {} (upstream {})",
        addr,
        config.api.base_url
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
