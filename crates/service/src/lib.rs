//! SmartPredict diagnostics HTTP service
//!
//! Wires the diagnostics library to an axum API: model registry at startup,
//! prediction and drift endpoints, health probes and Prometheus metrics.

pub mod api;
pub mod config;
