//! Prediction web server
//!
//! Serves the input form on `/`, predictions on `/predict` and a JSON
//! health probe on `/health`. Artifacts are provisioned and loaded once
//! before the listener binds.

mod api;
mod handlers;
pub mod page;
mod state;

pub use api::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use crate::artifacts::{ArtifactConfig, ArtifactStore};
use crate::error::SalesError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub artifacts: ArtifactConfig,
}

impl ServerConfig {
    /// Read `API_HOST`, `API_PORT` and the artifact variables, with defaults
    pub fn from_env() -> crate::Result<Self> {
        let port = match std::env::var("API_PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                SalesError::Config(format!("API_PORT must be a port number, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port,
            artifacts: ArtifactConfig::default(),
        })
    }

    pub fn new(host: impl Into<String>, port: u16, artifacts: ArtifactConfig) -> Self {
        Self {
            host: host.into(),
            port,
            artifacts,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Provision artifacts, then serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        artifacts_dir = %config.artifacts.dir.display(),
        started_at = %start_time.to_rfc3339(),
        "Preparing artifacts"
    );

    let store = ArtifactStore::provision_and_load(&config.artifacts)
        .await
        .context("failed to prepare model artifacts")?;

    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(config.clone(), Arc::new(store)));
    let app = create_router(state);

    info!(
        host = %config.host,
        port = config.port,
        address = %addr,
        "Video game sales predictor starting"
    );
    info!(url = %format!("http://{}", addr), "Prediction form available");
    info!(url = %format!("http://{}/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl+c handler, running until killed");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    info!("Server started successfully (press ctrl+c to stop)");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::new("127.0.0.1", 5000, ArtifactConfig::new());
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = ServerConfig::new("not a host", 5000, ArtifactConfig::new());
        assert!(config.socket_addr().is_err());
    }
}
