//! CLI command implementations

pub mod diagnostics;
pub mod predict;
pub mod service;
