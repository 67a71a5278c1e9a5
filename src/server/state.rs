//! Application state shared across handlers

use std::sync::Arc;

use crate::artifacts::ArtifactStore;
use crate::inference::PredictionEngine;

use super::ServerConfig;

/// Read-only state: nothing here is mutated after startup, so no locks
pub struct AppState {
    pub config: ServerConfig,
    pub engine: PredictionEngine,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<ArtifactStore>) -> Self {
        Self {
            config,
            engine: PredictionEngine::new(store),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
