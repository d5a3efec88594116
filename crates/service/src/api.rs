//! HTTP API for predictions, diagnostics, health checks and metrics
//!
//! The transport layer is deliberately thin: handlers parse, delegate to
//! `diagnostics-lib`, and serialize. Diagnostic endpoints return their
//! errors as structured `{"error": ...}` JSON bodies with HTTP 200, matching
//! the dashboard's contract; only the probe endpoints speak in status codes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use diagnostics_lib::{
    dataset, drift,
    health::{ComponentStatus, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    predictor, smoothing,
    types::{
        BatteryFeatures, FeatureVector, HydraulicFeatures, MachineClass, MotorFeatures,
    },
    DiagnosticsError, ModelRegistry,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Shared application state
pub struct AppState {
    pub registry: ModelRegistry,
    pub health_registry: HealthRegistry,
    pub metrics: ServiceMetrics,
    pub logger: StructuredLogger,
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(
        registry: ModelRegistry,
        health_registry: HealthRegistry,
        metrics: ServiceMetrics,
        logger: StructuredLogger,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            health_registry,
            metrics,
            logger,
            data_dir,
        }
    }
}

/// Serialize a diagnostics outcome into the 200-with-error-body contract
fn ok_or_error<T: Serialize>(result: Result<T, DiagnosticsError>) -> Json<Value> {
    match result.and_then(|value| serde_json::to_value(value).map_err(DiagnosticsError::internal))
    {
        Ok(value) => Json(value),
        Err(err) => Json(json!({ "error": err.to_string() })),
    }
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the SmartPredict Predictive Maintenance API!" }))
}

fn run_prediction(
    state: &AppState,
    class: MachineClass,
    features: FeatureVector,
) -> Json<Value> {
    let start = Instant::now();
    let result = predictor::predict(&state.registry, class, &features);
    let latency = start.elapsed().as_secs_f64();

    match &result {
        Ok(health) => {
            state.metrics.observe_prediction_latency(latency);
            state.metrics.inc_predictions_served(class.wire_name());
            let status = match health {
                diagnostics_lib::HealthResult::Status { status, .. } => Some(status.as_str()),
                diagnostics_lib::HealthResult::Value { .. } => None,
            };
            state.logger.log_prediction(class.wire_name(), status, latency);
        }
        Err(_) => state.metrics.inc_prediction_errors(),
    }
    ok_or_error(result)
}

async fn predict_battery(
    State(state): State<Arc<AppState>>,
    Json(features): Json<BatteryFeatures>,
) -> Json<Value> {
    run_prediction(&state, MachineClass::Battery, FeatureVector::Battery(features))
}

async fn predict_motor(
    State(state): State<Arc<AppState>>,
    Json(features): Json<MotorFeatures>,
) -> Json<Value> {
    run_prediction(&state, MachineClass::Motor, FeatureVector::Motor(features))
}

async fn predict_hydraulic(
    State(state): State<Arc<AppState>>,
    Json(features): Json<HydraulicFeatures>,
) -> Json<Value> {
    run_prediction(&state, MachineClass::Hydraulic, FeatureVector::Hydraulic(features))
}

async fn explain_motor(
    State(state): State<Arc<AppState>>,
    Json(features): Json<MotorFeatures>,
) -> Json<Value> {
    let result = state
        .registry
        .attributor_for(MachineClass::Motor)
        .ok_or(DiagnosticsError::ExplainerUnavailable)
        .and_then(|model| model.explain(&FeatureVector::Motor(features)));

    if let Ok(attributions) = &result {
        state.metrics.inc_explanations_served();
        if let Some(top) = attributions.first() {
            state.logger.log_explanation("motor", &top.feature);
        }
    }
    ok_or_error(result)
}

async fn drift_analysis(
    State(state): State<Arc<AppState>>,
    Path(machine_type): Path<String>,
) -> Json<Value> {
    let start = Instant::now();
    let result = machine_type
        .parse::<MachineClass>()
        .and_then(|class| drift::analyze(class, &state.data_dir));

    match &result {
        Ok(report) => {
            state
                .metrics
                .observe_drift_latency(start.elapsed().as_secs_f64());
            state.metrics.inc_drift_reports(&machine_type);
            state.logger.log_drift_report(&machine_type, report.data.len());
        }
        Err(_) => state.metrics.inc_drift_errors(),
    }
    ok_or_error(result)
}

async fn fleet_clusters(
    State(state): State<Arc<AppState>>,
    Path(machine_type): Path<String>,
) -> Json<Value> {
    // Unrecognized machine names get the same answer as machines that carry
    // no cluster file
    let result = match machine_type.parse::<MachineClass>() {
        Ok(class) => dataset::fleet_clusters(class, &state.data_dir),
        Err(_) => Err(DiagnosticsError::ClusterUnavailable),
    };
    ok_or_error(result)
}

/// Simulated retraining kickoff; a real deployment would enqueue a training
/// job here
async fn retrain(
    State(state): State<Arc<AppState>>,
    Path(machine_type): Path<String>,
) -> Json<Value> {
    state.logger.log_retrain_requested(&machine_type);
    Json(json!({
        "status": "success",
        "message": format!(
            "Retraining pipeline for {machine_type} model has been successfully initiated."
        ),
    }))
}

async fn visualize_noise_filter() -> Json<Value> {
    ok_or_error(Ok(smoothing::noise_filter_demo()))
}

async fn visualize_kalman_filter() -> Json<Value> {
    ok_or_error(Ok(smoothing::kalman_comparison_demo()))
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still operational
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            err.to_string().into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/predict/battery", post(predict_battery))
        .route("/predict/motor", post(predict_motor))
        .route("/predict/hydraulic", post(predict_hydraulic))
        .route("/explain/motor", post(explain_motor))
        .route("/drift-analysis/:machine_type", get(drift_analysis))
        .route("/fleet-clusters/:machine_type", get(fleet_clusters))
        .route("/retrain/:machine_type", get(retrain))
        .route("/visualize/noise-filter", get(visualize_noise_filter))
        .route("/visualize/kalman-filter", get(visualize_kalman_filter))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
