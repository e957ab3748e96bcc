//! SWOT Engine - Main entry point.

use anyhow::Result;
use swot_common::config::Config;
use swot_common::logging::init_logging;
use swot_engine::SwotService;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_and_validate()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("SWOT Engine v{}", env!("CARGO_PKG_VERSION"));

    // Start the engine service
    let service = SwotService::new(config);
    service.start().await
}
