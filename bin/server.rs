// Price Service - Web Server
// JSON RPC surface over HTTP with Axum

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use price_service::{api::app_router, build_service, init_tracing, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();
    init_tracing(config.store.mode);

    let service = build_service(&config.store)
        .with_context(|| format!("Failed to open database {}", config.store.db.display()))?;

    serve(config, Arc::new(service)).await
}

async fn serve(config: ServerConfig, service: Arc<price_service::DefaultPriceService>) -> Result<()> {
    let app = app_router(service, config.static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.addr))?;

    tracing::info!(
        addr = %config.addr,
        db = %config.store.db.display(),
        version = price_service::VERSION,
        "price server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("price server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
