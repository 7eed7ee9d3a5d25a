//! HTTP API: upload PDFs, get merged or split PDFs back.

mod error;
mod handlers;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Ports tried, in order, when none is configured.
pub const DEFAULT_PORTS: RangeInclusive<u16> = 8000..=8010;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: Option<u16>,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn new(host: IpAddr, port: Option<u16>, max_upload_mb: usize) -> Self {
        ServerConfig {
            host,
            port,
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}

pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/merge", post(handlers::merge))
        .route("/split", post(handlers::split))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured port, or the first free one in [`DEFAULT_PORTS`].
pub async fn bind(config: &ServerConfig) -> Result<TcpListener> {
    if let Some(port) = config.port {
        let addr = SocketAddr::new(config.host, port);
        return TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr));
    }

    for port in DEFAULT_PORTS {
        let addr = SocketAddr::new(config.host, port);
        match TcpListener::bind(addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) => warn!("Port {} unavailable: {}", port, e),
        }
    }

    anyhow::bail!(
        "No free port in {}..={} on {}",
        DEFAULT_PORTS.start(),
        DEFAULT_PORTS.end(),
        config.host
    )
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let listener = bind(&config).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
