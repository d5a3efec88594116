//! Integration tests for the service API endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use diagnostics_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    ModelRegistry,
};
use smartpredict_service::api::{create_router, AppState};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    health_registry: HealthRegistry,
    data_dir: TempDir,
}

/// App with no models loaded and an empty data directory
async fn setup_test_app() -> TestApp {
    let data_dir = TempDir::new().unwrap();
    let health_registry = HealthRegistry::new();
    health_registry.register(components::MODELS).await;
    health_registry.register(components::DATASETS).await;

    let registry = ModelRegistry::empty();
    health_registry.apply_load_report(&registry.load_report()).await;
    health_registry.apply_dataset_probe(data_dir.path()).await;
    health_registry.set_ready(true).await;

    let state = Arc::new(AppState::new(
        registry,
        health_registry.clone(),
        ServiceMetrics::new(),
        StructuredLogger::new("smartpredict-test"),
        data_dir.path().to_path_buf(),
    ));
    TestApp {
        router: create_router(state),
        health_registry,
        data_dir,
    }
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(
    router: Router,
    uri: &str,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_welcome_message() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Welcome to the SmartPredict Predictive Maintenance API!"
    );
}

#[tokio::test]
async fn test_predict_battery_without_model_reports_error_body() {
    let app = setup_test_app().await;
    let payload = serde_json::json!({
        "cycle": 10, "capacity": 1.85, "temp_mean": 24.0,
        "voltage_mean": 3.7, "current_mean": -1.2,
        "degradation_anomaly_score": 0.01
    });
    let (status, body) = post_json(app.router, "/predict/battery", payload).await;

    // Diagnostic errors travel in the body, not the status code
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Battery model not loaded.");
}

#[tokio::test]
async fn test_explain_motor_without_model_reports_error_body() {
    let app = setup_test_app().await;
    let payload = serde_json::json!({
        "air_temperature_k": 298.1, "process_temperature_k": 308.6,
        "rotational_speed_rpm": 1551, "torque_nm": 42.8, "tool_wear_min": 108
    });
    let (status, body) = post_json(app.router, "/explain/motor", payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"], "Model or explainer not loaded.");
}

#[tokio::test]
async fn test_drift_unknown_machine_body_is_verbatim() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/drift-analysis/turbine").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "error": "Unknown machine type" }));
}

#[tokio::test]
async fn test_drift_missing_dataset_names_machine_and_path() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/drift-analysis/battery").await;

    assert_eq!(status, StatusCode::OK);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Dataset for 'battery' not found at "));
    assert!(message.ends_with("processed_battery_data.csv."));
}

#[tokio::test]
async fn test_drift_battery_report_shape() {
    let app = setup_test_app().await;
    let rows: String = (0..200)
        .map(|i| format!("{}\n", 1.5 + (i as f64) * 0.002))
        .collect();
    std::fs::write(
        app.data_dir.path().join("processed_battery_data.csv"),
        format!("capacity\n{rows}"),
    )
    .unwrap();

    let (status, body) = get_json(app.router, "/drift-analysis/battery").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    let bins = body["data"].as_array().unwrap();
    assert_eq!(bins.len(), 39);

    let original_total: u64 = bins.iter().map(|b| b["original_count"].as_u64().unwrap()).sum();
    let live_total: u64 = bins.iter().map(|b| b["live_count"].as_u64().unwrap()).sum();
    assert_eq!(original_total, 200);
    assert_eq!(live_total, 200);
}

#[tokio::test]
async fn test_clusters_hydraulic_not_available() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/fleet-clusters/hydraulic").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["error"],
        "Clustering analysis not available for this machine type."
    );
}

#[tokio::test]
async fn test_clusters_unknown_machine_not_available() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/fleet-clusters/turbine").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["error"],
        "Clustering analysis not available for this machine type."
    );
}

#[tokio::test]
async fn test_clusters_motor_missing_file() {
    let app = setup_test_app().await;
    let (_, body) = get_json(app.router, "/fleet-clusters/motor").await;
    assert_eq!(body["error"], "Clustered data for 'motor' not found.");
}

#[tokio::test]
async fn test_clusters_motor_downsampled_to_limit() {
    let app = setup_test_app().await;
    let rows: String = (0..1000).map(|i| format!("{i},{}\n", i % 3)).collect();
    std::fs::write(
        app.data_dir.path().join("clustered_motor_data.csv"),
        format!("UDI,cluster\n{rows}"),
    )
    .unwrap();

    let (status, body) = get_json(app.router, "/fleet-clusters/motor").await;
    assert_eq!(status, StatusCode::OK);
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 300);
    assert!(records[0].get("UDI").is_some());
    assert!(records[0].get("cluster").is_some());
}

#[tokio::test]
async fn test_retrain_reports_kickoff_message() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/retrain/motor").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["message"],
        "Retraining pipeline for motor model has been successfully initiated."
    );
}

#[tokio::test]
async fn test_noise_filter_visualization_shape() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/visualize/noise-filter").await;

    assert_eq!(status, StatusCode::OK);
    let samples = body.as_array().unwrap();
    assert_eq!(samples.len(), 100);

    // Window-5 moving average: exactly four leading nulls
    for sample in &samples[..4] {
        assert!(sample["moving_average"].is_null());
    }
    for sample in &samples[4..] {
        assert!(sample["moving_average"].is_number());
    }
    assert!(samples.iter().all(|s| s["kalman_estimate"].is_null()));
    assert_eq!(samples[0]["time_step"], 0);
    assert_eq!(samples[99]["time_step"], 99);
}

#[tokio::test]
async fn test_kalman_filter_visualization_shape() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/visualize/kalman-filter").await;

    assert_eq!(status, StatusCode::OK);
    let samples = body.as_array().unwrap();
    assert_eq!(samples.len(), 100);

    // Window-10 moving average: nine leading nulls
    for sample in &samples[..9] {
        assert!(sample["moving_average"].is_null());
    }
    assert!(samples[9]["moving_average"].is_number());
    assert!(samples.iter().all(|s| s["kalman_estimate"].is_number()));
}

#[tokio::test]
async fn test_healthz_degraded_when_models_missing_still_ok() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/healthz").await;

    // No models loaded: degraded, but the service stays operational
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert!(body["components"]["models"]["message"]
        .as_str()
        .unwrap()
        .contains("battery"));
}

#[tokio::test]
async fn test_readyz_ready_after_initialization() {
    let app = setup_test_app().await;
    let (status, body) = get_json(app.router, "/readyz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_readyz_not_ready_when_component_unhealthy() {
    let app = setup_test_app().await;
    app.health_registry
        .set_unhealthy(components::DATASETS, "data directory unreadable")
        .await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let app = setup_test_app().await;

    let response = app
        .router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("smartpredict_prediction_latency_seconds"));
    assert!(metrics_text.contains("smartpredict_drift_latency_seconds"));
}
