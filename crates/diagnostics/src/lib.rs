//! Diagnostics library for predictive machine maintenance
//!
//! This crate provides the core functionality for:
//! - Per-machine health prediction from pre-trained ONNX models
//! - Feature attribution for motor predictions
//! - Data drift detection over reference datasets
//! - Signal smoothing (moving average and Kalman filtering)
//! - Health checks and observability

pub mod dataset;
pub mod drift;
pub mod error;
pub mod explain;
pub mod health;
pub mod observability;
pub mod predictor;
pub mod registry;
pub mod schema;
pub mod smoothing;
pub mod types;

pub use error::DiagnosticsError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use observability::{ServiceMetrics, StructuredLogger};
pub use registry::{LoadReport, ModelConfig, ModelHandle, ModelRegistry};
pub use types::*;
