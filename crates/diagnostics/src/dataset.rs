//! Reference dataset access
//!
//! Thin CSV layer over the local reference datasets. Reads are per-call and
//! stateless; nothing here caches or mutates files. Non-numeric cells in a
//! numeric column are skipped rather than treated as errors, since the
//! reference files carry id and label columns alongside the sensor columns.

use crate::error::DiagnosticsError;
use crate::types::MachineClass;
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde_json::{Map, Number, Value};
use std::path::Path;
use tracing::debug;

/// Cluster payloads are capped at this many records
pub const MAX_CLUSTER_RECORDS: usize = 300;

/// Seed for the deterministic cluster downsample
pub const CLUSTER_SAMPLE_SEED: u64 = 42;

/// Pre-computed cluster assignment files inside the data directory
pub const BATTERY_CLUSTER_FILE: &str = "clustered_fleet_data.csv";
pub const MOTOR_CLUSTER_FILE: &str = "clustered_motor_data.csv";

/// Load one numeric column from a CSV file
///
/// An unreadable or missing file maps to `DatasetRead` carrying the
/// attempted path; a missing column names the headers that do exist.
/// Callers that know which machine a file belongs to check for existence
/// themselves, so the wire-facing `DatasetNotFound` message can carry the
/// machine name rather than a file-level detail.
pub fn load_column(path: &Path, column: &str) -> Result<Vec<f64>, DiagnosticsError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| DiagnosticsError::DatasetRead {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;

    let headers = reader
        .headers()
        .map_err(|err| DiagnosticsError::DatasetRead {
            path: path.display().to_string(),
            message: err.to_string(),
        })?
        .clone();
    let idx = headers.iter().position(|h| h == column).ok_or_else(|| {
        DiagnosticsError::ColumnNotFound {
            column: column.to_string(),
            path: path.display().to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        }
    })?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| DiagnosticsError::DatasetRead {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        if let Some(cell) = record.get(idx) {
            if let Ok(value) = cell.trim().parse::<f64>() {
                values.push(value);
            }
        }
    }

    debug!(path = %path.display(), column, rows = values.len(), "Dataset column loaded");
    Ok(values)
}

/// Mean of one numeric column; errors if the column is empty
pub fn column_mean(path: &Path, column: &str) -> Result<f64, DiagnosticsError> {
    let values = load_column(path, column)?;
    if values.is_empty() {
        return Err(DiagnosticsError::DatasetRead {
            path: path.display().to_string(),
            message: format!("column '{column}' has no numeric values"),
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Load every row of a CSV file as an ordered JSON map
///
/// Numeric cells become JSON numbers, everything else stays a string. Column
/// order follows the file's header order.
pub fn load_cluster_records(path: &Path) -> Result<Vec<Map<String, Value>>, DiagnosticsError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| DiagnosticsError::DatasetRead {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let headers = reader
        .headers()
        .map_err(|err| DiagnosticsError::DatasetRead {
            path: path.display().to_string(),
            message: err.to_string(),
        })?
        .clone();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| DiagnosticsError::DatasetRead {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), cell_value(cell));
        }
        records.push(row);
    }
    Ok(records)
}

fn cell_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(cell.to_string())
}

/// Pre-computed fleet cluster assignments for `class`
///
/// Only battery and motor carry cluster files. The motor payload is
/// downsampled to [`MAX_CLUSTER_RECORDS`] with a fixed seed so repeated
/// calls return the same subset; the battery file is small enough to return
/// whole.
pub fn fleet_clusters(
    class: MachineClass,
    data_dir: &Path,
) -> Result<Vec<Map<String, Value>>, DiagnosticsError> {
    let (file, downsampled) = match class {
        MachineClass::Battery => (BATTERY_CLUSTER_FILE, false),
        MachineClass::Motor => (MOTOR_CLUSTER_FILE, true),
        MachineClass::Hydraulic | MachineClass::Pump => {
            return Err(DiagnosticsError::ClusterUnavailable)
        }
    };

    let path = data_dir.join(file);
    if !path.exists() {
        return Err(DiagnosticsError::ClusterDataNotFound {
            machine: class.wire_name().to_string(),
        });
    }
    let records = load_cluster_records(&path)?;

    if downsampled {
        Ok(downsample(records, MAX_CLUSTER_RECORDS, CLUSTER_SAMPLE_SEED))
    } else {
        Ok(records)
    }
}

/// Downsample to at most `limit` records, deterministically
///
/// Sampling is uniform without replacement from a fixed-seed RNG, so two
/// calls over the same input produce the same subset. The survivors keep
/// their original relative order. Inputs at or under the limit pass through
/// untouched.
pub fn downsample<T>(records: Vec<T>, limit: usize, seed: u64) -> Vec<T> {
    if records.len() <= limit {
        return records;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut chosen = sample(&mut rng, records.len(), limit).into_vec();
    chosen.sort_unstable();

    let mut keep = vec![false; records.len()];
    for idx in chosen {
        keep[idx] = true;
    }
    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, kept)| kept.then_some(record))
        .collect()
}
