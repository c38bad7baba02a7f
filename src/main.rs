use std::sync::Arc;

use anyhow::{Context, Result};
use nimbus_api::AppState;
use nimbus_core::Config;
use nimbus_weather::{RefreshOutcome, WeatherService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    nimbus_core::init()?;

    let (config, _validation) = Config::load_validated()?;

    let service = Arc::new(WeatherService::from_config(&config.weather)?);
    if let RefreshOutcome::Installed { areas } = service.start().await {
        tracing::info!("Weather cache warmed with {} areas", areas);
    }

    let app = nimbus_api::router(AppState::new(Arc::clone(&service)));
    let listener = tokio::net::TcpListener::bind(config.server.bind_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    tracing::info!("Nimbus listening on {}", config.server.bind_addr);

    serve(listener, app).await?;

    // Graceful shutdown
    service.stop().await;
    tracing::info!("Nimbus stopped");
    Ok(())
}

async fn serve(listener: tokio::net::TcpListener, app: axum::Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown requested");
        })
        .await
        .context("HTTP server error")
}
