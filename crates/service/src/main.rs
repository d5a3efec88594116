//! SmartPredict service - predictive maintenance inference API
//!
//! Loads the per-machine ONNX models once at startup and serves
//! predictions, attributions, drift reports and smoothing demos over HTTP.

use anyhow::Result;
use diagnostics_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    registry::{ModelConfig, ModelRegistry},
};
use smartpredict_service::{api, config};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting smartpredict-service");

    // Load configuration
    let config = config::ServiceConfig::load()?;
    info!(
        model_dir = %config.model_dir.display(),
        data_dir = %config.data_dir.display(),
        "Service configured"
    );

    // Load models; absent artifacts degrade, never fail
    let registry = ModelRegistry::load(&ModelConfig {
        model_dir: config.model_dir.clone(),
        data_dir: config.data_dir.clone(),
    });
    let report = registry.load_report();

    // Initialize health registry
    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODELS).await;
    health_registry.register(components::DATASETS).await;
    health_registry.register(components::EXPLAINER).await;
    health_registry.apply_load_report(&report).await;
    health_registry.apply_dataset_probe(&config.data_dir).await;

    // Initialize metrics
    let metrics = ServiceMetrics::new();

    // Initialize structured logger
    let logger = StructuredLogger::new("smartpredict");
    let loaded = [report.battery, report.motor, report.hydraulic]
        .iter()
        .filter(|present| **present)
        .count();
    logger.log_startup(SERVICE_VERSION, loaded);
    for machine in report.missing() {
        logger.log_model_missing(machine, "artifact missing or unreadable");
    }

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        registry,
        health_registry.clone(),
        metrics,
        logger.clone(),
        config.data_dir.clone(),
    ));

    // Mark service as ready after initialization
    health_registry.set_ready(true).await;

    // Start the API server
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    logger.log_shutdown("SIGINT received");
    api_handle.abort();
    info!("Shutting down");

    Ok(())
}
