//! Swot Engine - Layered SWOT analysis service.
//!
//! This crate provides:
//! - Language-model structuring of free-text notes into scored SWOT items
//! - A gap x impact priority model across three analytical layers
//! - Flat-file run persistence (JSON per run + append-only CSV log)
//! - An HTTP API and HTML front end

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod analysis;
pub mod model;
pub mod provider;
pub mod routes;
pub mod scoring;
pub mod store;
pub mod templates;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use swot_common::config::Config;
use swot_common::error::Error;

pub use analysis::{AnalysisBridge, LayerNotes, SeedInputs};
pub use model::{make_run_id, Dimension, Layer, LayerOutput, RunSummary, SwotItem};
pub use provider::{build_provider, ChatRequest, ChatResponse, Provider, ProviderError};
pub use routes::{build_router, AppState};
pub use scoring::{compute_priorities, DimensionPriority, PriorityReport, RankedPriority};
pub use store::RunStore;

// ============================================================================
// Engine Service
// ============================================================================

/// Service wrapper that wires provider, store, and router from configuration
/// and runs the HTTP server.
pub struct SwotService {
    config: Config,
}

impl SwotService {
    /// Create a new service.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Build the shared application state.
    pub fn build_state(&self) -> Result<Arc<AppState>, Error> {
        let provider = provider::build_provider(&self.config.provider)?;
        let bridge = Arc::new(AnalysisBridge::new(provider, &self.config.provider));
        let store = Arc::new(RunStore::new(&self.config.storage)?);

        Ok(Arc::new(AppState {
            config: Arc::new(self.config.clone()),
            bridge,
            store,
        }))
    }

    /// Build the engine router with all routes.
    pub fn build_router(&self) -> Result<Router, Error> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Ok(routes::build_router(self.build_state()?).layer(cors))
    }

    /// Start the service.
    pub async fn start(&self) -> anyhow::Result<()> {
        tracing::info!("Starting SWOT engine service");

        let router = self.build_router()?;

        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        tracing::info!("Starting SWOT engine HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swot_common::config::ProviderConfig;

    #[test]
    fn test_service_builds_with_ollama_config() {
        let mut config = Config::default();
        config.provider = ProviderConfig {
            kind: "ollama".into(),
            ..Default::default()
        };
        config.storage.data_dir = std::env::temp_dir().join("swot-engine-lib-test");

        let service = SwotService::new(config);
        assert!(service.build_state().is_ok());
    }

    #[test]
    fn test_service_rejects_missing_openai_key() {
        let mut config = Config::default();
        config.storage.data_dir = std::env::temp_dir().join("swot-engine-lib-test");

        let service = SwotService::new(config);
        assert!(service.build_state().is_err());
    }
}
