//! Observability infrastructure for the diagnostics service
//!
//! Provides:
//! - Prometheus metrics (prediction and drift latency, per-machine counters, model info)
//! - Structured JSON logging with tracing

use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    GaugeVec, Histogram, IntCounter, IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ServiceMetricsInner> = OnceLock::new();

/// Inner metrics structure that holds the actual Prometheus metrics
struct ServiceMetricsInner {
    prediction_latency_seconds: Histogram,
    drift_latency_seconds: Histogram,
    predictions_served: IntCounterVec,
    explanations_served: IntCounter,
    drift_reports_generated: IntCounterVec,
    prediction_errors: IntCounter,
    drift_errors: IntCounter,
    model_info: GaugeVec,
}

impl ServiceMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "smartpredict_prediction_latency_seconds",
                "Time spent running model inference for a prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            drift_latency_seconds: register_histogram!(
                "smartpredict_drift_latency_seconds",
                "Time spent computing a drift comparison",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register drift_latency_seconds"),

            predictions_served: register_int_counter_vec!(
                "smartpredict_predictions_served_total",
                "Total predictions served, by machine class",
                &["machine"]
            )
            .expect("Failed to register predictions_served"),

            explanations_served: register_int_counter!(
                "smartpredict_explanations_served_total",
                "Total feature attributions served"
            )
            .expect("Failed to register explanations_served"),

            drift_reports_generated: register_int_counter_vec!(
                "smartpredict_drift_reports_total",
                "Total drift reports generated, by machine class",
                &["machine"]
            )
            .expect("Failed to register drift_reports_generated"),

            prediction_errors: register_int_counter!(
                "smartpredict_prediction_errors_total",
                "Total prediction request failures"
            )
            .expect("Failed to register prediction_errors"),

            drift_errors: register_int_counter!(
                "smartpredict_drift_errors_total",
                "Total drift analysis failures"
            )
            .expect("Failed to register drift_errors"),

            model_info: register_gauge_vec!(
                "smartpredict_model_info",
                "Information about the currently loaded models",
                &["machine", "checksum"]
            )
            .expect("Failed to register model_info"),
        }
    }
}

/// Service metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct ServiceMetrics {
    // This is just a marker - we use the global instance
    _private: (),
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ServiceMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ServiceMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    /// Record a prediction latency observation
    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    /// Record a drift analysis latency observation
    pub fn observe_drift_latency(&self, duration_secs: f64) {
        self.inner().drift_latency_seconds.observe(duration_secs);
    }

    /// Increment the per-machine prediction counter
    pub fn inc_predictions_served(&self, machine: &str) {
        self.inner()
            .predictions_served
            .with_label_values(&[machine])
            .inc();
    }

    /// Increment explanations served counter
    pub fn inc_explanations_served(&self) {
        self.inner().explanations_served.inc();
    }

    /// Increment the per-machine drift report counter
    pub fn inc_drift_reports(&self, machine: &str) {
        self.inner()
            .drift_reports_generated
            .with_label_values(&[machine])
            .inc();
    }

    /// Increment prediction errors counter
    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    /// Increment drift errors counter
    pub fn inc_drift_errors(&self) {
        self.inner().drift_errors.inc();
    }

    /// Record a loaded model's identity
    pub fn set_model_info(&self, machine: &str, checksum: &str) {
        self.inner()
            .model_info
            .with_label_values(&[machine, checksum])
            .set(1.0);
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions, drift
/// reports, and other significant events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, models_loaded: usize) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            models_loaded = models_loaded,
            "Diagnostics service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "Diagnostics service shutting down"
        );
    }

    /// Log a served prediction
    pub fn log_prediction(&self, machine: &str, status: Option<&str>, latency_secs: f64) {
        info!(
            event = "prediction_served",
            service = %self.service_name,
            machine = %machine,
            status = status.unwrap_or("n/a"),
            latency_secs = latency_secs,
            "Prediction served"
        );
    }

    /// Log a served feature attribution
    pub fn log_explanation(&self, machine: &str, top_feature: &str) {
        info!(
            event = "explanation_served",
            service = %self.service_name,
            machine = %machine,
            top_feature = %top_feature,
            "Feature attribution served"
        );
    }

    /// Log a generated drift report
    pub fn log_drift_report(&self, machine: &str, bins: usize) {
        info!(
            event = "drift_report_generated",
            service = %self.service_name,
            machine = %machine,
            bins = bins,
            "Drift report generated"
        );
    }

    /// Log a model that failed to load
    pub fn log_model_missing(&self, machine: &str, reason: &str) {
        warn!(
            event = "model_missing",
            service = %self.service_name,
            machine = %machine,
            reason = %reason,
            "Model unavailable, its endpoints will report errors"
        );
    }

    /// Log a simulated retraining request
    pub fn log_retrain_requested(&self, machine: &str) {
        info!(
            event = "retrain_requested",
            service = %self.service_name,
            machine = %machine,
            "Retraining requested"
        );
    }
}
