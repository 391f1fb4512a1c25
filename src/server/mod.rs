//! HTTP server for where-am-i
//!
//! Exposes the resolver over a small REST API.

pub mod routes;
pub mod state;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resolve::DefaultResolver;
use routes::create_router;
use state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Start the HTTP server
///
/// # Arguments
/// * `config` - Effective configuration (file plus environment overrides)
///
/// # Returns
/// Returns once the server has shut down after Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let addr = config.server_addr();
    run_on(&addr, config).await
}

/// Start the HTTP server with a specific address
///
/// Useful for tests or when you want to override config
pub async fn run_on(addr: &str, config: Config) -> Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| Error::Server(format!("Invalid server address: {}", e)))?;

    let resolver = DefaultResolver::from_config(&config)?;
    info!(
        store = resolver.store().name(),
        ttl_days = config.cache.ttl_days,
        precision = config.cache.precision,
        "Cache configured"
    );

    let state = Arc::new(AppState::new(resolver));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Server(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::Server(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
