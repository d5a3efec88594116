//! Error taxonomy for the diagnostics core
//!
//! Every variant is a structured, user-visible outcome; none of them should
//! terminate the process. The `Display` strings of `ModelUnavailable` and
//! `UnknownMachineClass` are part of the wire contract.

use crate::types::MachineClass;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagnosticsError {
    /// The requested class's model failed to load or does not exist
    #[error("{0} model not loaded.")]
    ModelUnavailable(MachineClass),

    /// The motor model or its attribution model is absent
    #[error("Model or explainer not loaded.")]
    ExplainerUnavailable,

    /// Unrecognized machine class string; the payload carries what was sent
    #[error("Unknown machine type")]
    UnknownMachineClass(String),

    /// Reference dataset file is missing for a drift or cluster lookup
    #[error("Dataset for '{machine}' not found at {path}.")]
    DatasetNotFound { machine: String, path: String },

    /// No clustering artifacts exist for the requested class
    #[error("Clustering analysis not available for this machine type.")]
    ClusterUnavailable,

    /// Clustered reference data file is missing
    #[error("Clustered data for '{machine}' not found.")]
    ClusterDataNotFound { machine: String },

    /// A feature value outside the numeric domain or a mismatched payload
    #[error("invalid input for field '{field}': {message}")]
    MalformedInput { field: String, message: String },

    /// Dataset file exists but could not be read or parsed
    #[error("failed to read dataset {path}: {message}")]
    DatasetRead { path: String, message: String },

    /// Requested column does not exist in the dataset
    #[error("column '{column}' not found in {path}; available columns: {available}")]
    ColumnNotFound {
        column: String,
        path: String,
        available: String,
    },

    /// Any unanticipated internal failure, surfaced with its message
    #[error("{0}")]
    Internal(String),
}

impl DiagnosticsError {
    /// Wrap an arbitrary failure into the generic internal variant
    pub fn internal(err: impl std::fmt::Display) -> Self {
        DiagnosticsError::Internal(err.to_string())
    }
}
