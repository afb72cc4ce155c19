//! Admissions Prediction API - Main Entry Point

use api::{init_logging, run_server, Settings};
use inference_engine::PredictionService;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_logging(&settings.logging)?;

    info!("=== Admissions API v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading artifacts: {:?}", settings.artifacts);

    let service = match PredictionService::load(&settings.artifacts) {
        Ok(service) => service,
        Err(e) => {
            error!("Failed to load artifacts: {}", e);
            return Err(e.into());
        }
    };

    run_server(&settings.server.bind_addr, service).await?;

    Ok(())
}
