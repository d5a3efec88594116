//! Data drift detection
//!
//! Compares the training-time distribution of one representative feature
//! against a simulated live distribution. The live distribution is the
//! original shifted by a fixed per-class offset, so the expected drift shape
//! is known in advance and the comparison exercises the full reference
//! column every time.

use crate::dataset;
use crate::error::DiagnosticsError;
use crate::registry::MOTOR_DATASET_FILE;
use crate::types::{DriftBin, DriftReport, MachineClass};
use std::path::Path;
use tracing::info;

/// Battery reference dataset file name inside the data directory
pub const BATTERY_DATASET_FILE: &str = "processed_battery_data.csv";

/// Number of bin edges shared by both histograms; yields `BIN_EDGES - 1` bins
pub const BIN_EDGES: usize = 40;

/// Per-class drift comparison configuration
#[derive(Debug, Clone, Copy)]
pub struct DriftConfig {
    pub dataset_file: &'static str,
    pub column: &'static str,
    pub offset: f64,
}

impl DriftConfig {
    /// Fixed comparison setup for a machine class
    ///
    /// The hydraulic rig has no per-row reference CSV, so its drift check
    /// runs against a motor dataset column as a stand-in signal.
    pub fn for_class(class: MachineClass) -> Self {
        match class {
            MachineClass::Battery => Self {
                dataset_file: BATTERY_DATASET_FILE,
                column: "capacity",
                offset: -0.15,
            },
            MachineClass::Motor | MachineClass::Pump => Self {
                dataset_file: MOTOR_DATASET_FILE,
                column: "Torque [Nm]",
                offset: 6.5,
            },
            MachineClass::Hydraulic => Self {
                dataset_file: MOTOR_DATASET_FILE,
                column: "Process temperature [K]",
                offset: 10.0,
            },
        }
    }
}

/// `count` evenly spaced values from `start` to `stop`, both inclusive
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if count == 1 {
        return vec![start];
    }
    let step = (stop - start) / (count - 1) as f64;
    (0..count).map(|i| start + step * i as f64).collect()
}

/// Histogram counts over equal-width bins spanning `min..max`
///
/// Half-open bins, except the last bin which is right-inclusive so the
/// maximum value is counted. A degenerate span puts everything in bin 0.
pub fn histogram(values: &[f64], min: f64, max: f64, bins: usize) -> Vec<u64> {
    let mut counts = vec![0u64; bins];
    let span = max - min;
    for &value in values {
        if value < min || value > max {
            continue;
        }
        let idx = if span > 0.0 {
            (((value - min) / span) * bins as f64).floor() as usize
        } else {
            0
        };
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Drift comparison for `class` over its reference feature column
pub fn analyze(class: MachineClass, data_dir: &Path) -> Result<DriftReport, DiagnosticsError> {
    let config = DriftConfig::for_class(class);
    let path = data_dir.join(config.dataset_file);
    if !path.exists() {
        return Err(DiagnosticsError::DatasetNotFound {
            machine: class.wire_name().to_string(),
            path: path.display().to_string(),
        });
    }

    let original = dataset::load_column(&path, config.column)?;
    if original.is_empty() {
        return Err(DiagnosticsError::DatasetRead {
            path: path.display().to_string(),
            message: format!("column '{}' has no numeric values", config.column),
        });
    }
    let live: Vec<f64> = original.iter().map(|v| v + config.offset).collect();

    // Shared edges over the combined range so bins line up
    let min = original
        .iter()
        .chain(&live)
        .copied()
        .fold(f64::INFINITY, f64::min);
    let max = original
        .iter()
        .chain(&live)
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let edges = linspace(min, max, BIN_EDGES);
    let bins = BIN_EDGES - 1;

    let original_counts = histogram(&original, min, max, bins);
    let live_counts = histogram(&live, min, max, bins);

    let data = edges
        .iter()
        .take(bins)
        .zip(original_counts)
        .zip(live_counts)
        .map(|((edge, original_count), live_count)| DriftBin {
            bin_start: *edge,
            original_count,
            live_count,
        })
        .collect();

    info!(machine = %class, column = config.column, offset = config.offset, "Drift report generated");
    Ok(DriftReport {
        status: "success".to_string(),
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn data_dir_with(file: &str, contents: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let mut f = std::fs::File::create(dir.path().join(file)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        dir
    }

    #[test]
    fn test_linspace_endpoints_and_spacing() {
        let edges = linspace(0.0, 10.0, 40);
        assert_eq!(edges.len(), 40);
        assert_eq!(edges[0], 0.0);
        assert!((edges[39] - 10.0).abs() < 1e-12);
        let step = edges[1] - edges[0];
        for pair in edges.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_histogram_conserves_mass_including_maximum() {
        let values = vec![0.0, 1.0, 2.5, 5.0, 9.99, 10.0];
        let counts = histogram(&values, 0.0, 10.0, 39);
        assert_eq!(counts.iter().sum::<u64>(), values.len() as u64);
        // The maximum lands in the last bin, not off the end
        assert!(counts[38] >= 1);
    }

    #[test]
    fn test_histogram_degenerate_span() {
        let values = vec![3.0, 3.0, 3.0];
        let counts = histogram(&values, 3.0, 3.0, 39);
        assert_eq!(counts[0], 3);
        assert_eq!(counts.iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_battery_drift_report_shape_and_mass() {
        let rows: String = (0..100)
            .map(|i| format!("{}\n", 1.5 + (i as f64) * 0.005))
            .collect();
        let dir = data_dir_with(BATTERY_DATASET_FILE, &format!("capacity\n{rows}"));

        let report = analyze(MachineClass::Battery, dir.path()).unwrap();
        assert_eq!(report.status, "success");
        assert_eq!(report.data.len(), BIN_EDGES - 1);

        let original_total: u64 = report.data.iter().map(|b| b.original_count).sum();
        let live_total: u64 = report.data.iter().map(|b| b.live_count).sum();
        assert_eq!(original_total, 100);
        assert_eq!(live_total, 100);

        // Negative offset shifts the live distribution toward lower bins
        let original_first_half: u64 = report.data[..19].iter().map(|b| b.original_count).sum();
        let live_first_half: u64 = report.data[..19].iter().map(|b| b.live_count).sum();
        assert!(live_first_half > original_first_half);
    }

    #[test]
    fn test_motor_and_hydraulic_reports_conserve_mass() {
        let rows: String = (0..120)
            .map(|i| format!("{},{}\n", 38.0 + (i as f64) * 0.1, 305.0 + (i as f64) * 0.05))
            .collect();
        let dir = data_dir_with(
            MOTOR_DATASET_FILE,
            &format!("Torque [Nm],Process temperature [K]\n{rows}"),
        );

        for class in [
            MachineClass::Motor,
            MachineClass::Pump,
            MachineClass::Hydraulic,
        ] {
            let report = analyze(class, dir.path()).unwrap();
            assert_eq!(report.status, "success");
            assert_eq!(report.data.len(), BIN_EDGES - 1);
            let original_total: u64 = report.data.iter().map(|b| b.original_count).sum();
            let live_total: u64 = report.data.iter().map(|b| b.live_count).sum();
            assert_eq!(original_total, 120, "original mass for {class}");
            assert_eq!(live_total, 120, "live mass for {class}");
        }
    }

    #[test]
    fn test_live_distribution_is_original_shifted_by_offset() {
        // A constant-valued column makes the shift directly observable: the
        // shared edges span exactly |offset|, the original mass sits at one
        // end of the range and the live mass at the other.
        let cases = [
            (MachineClass::Battery, BATTERY_DATASET_FILE, "capacity", 1.8),
            (MachineClass::Motor, MOTOR_DATASET_FILE, "Torque [Nm]", 40.0),
            (
                MachineClass::Hydraulic,
                MOTOR_DATASET_FILE,
                "Process temperature [K]",
                308.0,
            ),
        ];

        for (class, file, column, value) in cases {
            let rows: String = (0..50).map(|_| format!("{value}\n")).collect();
            let dir = data_dir_with(file, &format!("{column}\n{rows}"));

            let config = DriftConfig::for_class(class);
            let report = analyze(class, dir.path()).unwrap();
            let bins = &report.data;

            let width = bins[1].bin_start - bins[0].bin_start;
            let span = width * (BIN_EDGES - 1) as f64;
            assert!(
                (span - config.offset.abs()).abs() < 1e-9,
                "range for {class} spans exactly the offset"
            );

            let (original_bin, live_bin) = if config.offset > 0.0 {
                (0, BIN_EDGES - 2)
            } else {
                (BIN_EDGES - 2, 0)
            };
            assert_eq!(bins[original_bin].original_count, 50);
            assert_eq!(bins[live_bin].live_count, 50);
        }
    }

    #[test]
    fn test_missing_dataset_names_machine_and_path() {
        let dir = TempDir::new().unwrap();
        let err = analyze(MachineClass::Battery, dir.path()).unwrap_err();
        match &err {
            DiagnosticsError::DatasetNotFound { machine, path } => {
                assert_eq!(machine, "battery");
                assert!(path.ends_with(BATTERY_DATASET_FILE));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("Dataset for 'battery' not found at "));
    }

    #[test]
    fn test_pump_shares_motor_drift_config() {
        let motor = DriftConfig::for_class(MachineClass::Motor);
        let pump = DriftConfig::for_class(MachineClass::Pump);
        assert_eq!(motor.column, pump.column);
        assert_eq!(motor.dataset_file, pump.dataset_file);
        assert_eq!(motor.offset, pump.offset);
    }
}
