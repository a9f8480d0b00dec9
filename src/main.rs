use anyhow::{Context, Result};
use itinerai::web::{self, AppState};
use itinerai::{AppConfig, FormController, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init(&config.logging)?;

    tracing::info!(
        model = %config.generation.model,
        "Starting itinerai {}",
        itinerai::VERSION
    );

    let controller = FormController::from_config(&config);
    // A missing key is reported on every submission; the form still serves
    if let Err(e) = controller.warm_up().await {
        tracing::warn!("Generation client not ready: {}", e);
    }

    let state = AppState::new(controller)?;
    web::run(&config.server, state).await?;
    Ok(())
}
