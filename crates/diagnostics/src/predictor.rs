//! Prediction service
//!
//! Routes a feature payload through the right model and normalizes the raw
//! model output into the uniform health shape. Each raw-output tag has
//! exactly one normalization rule; no machine-class string branching happens
//! past interpretation.

use crate::error::DiagnosticsError;
use crate::registry::ModelRegistry;
use crate::schema;
use crate::types::{FeatureVector, HealthResult, MachineClass};
use tracing::debug;

/// Ordinal severity codes the hydraulic model can emit, with their labels
pub const HYDRAULIC_STATUS_CODES: [(u32, &str); 3] = [
    (3, "Optimal Efficiency"),
    (20, "Reduced Efficiency"),
    (100, "Close to Total Failure"),
];

/// Status label for a hydraulic severity code
pub fn hydraulic_status(code: u32) -> &'static str {
    HYDRAULIC_STATUS_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, label)| *label)
        .unwrap_or("Unknown Condition")
}

/// Raw model output, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// Continuous regression value (battery RUL)
    Regression(f64),
    /// Binary classification, carried as the probability of the positive
    /// ("At Risk") class
    Binary { p_at_risk: f64 },
    /// Ordinal severity code (hydraulic)
    Ordinal(u32),
}

impl RawOutput {
    /// Interpret a model's output scores for the given class
    pub fn from_scores(class: MachineClass, scores: &[f64]) -> Result<Self, DiagnosticsError> {
        match class.model_class() {
            MachineClass::Battery => scores
                .first()
                .copied()
                .map(RawOutput::Regression)
                .ok_or_else(|| DiagnosticsError::Internal("empty battery model output".into())),
            MachineClass::Motor => {
                // Probability vector [P(Normal), P(At Risk)]
                if scores.len() < 2 {
                    return Err(DiagnosticsError::Internal(format!(
                        "motor model produced {} outputs, expected 2 class probabilities",
                        scores.len()
                    )));
                }
                Ok(RawOutput::Binary { p_at_risk: scores[1] })
            }
            MachineClass::Hydraulic => {
                // Score vector over the ordinal codes; the highest-scoring
                // code is the prediction
                if scores.len() != HYDRAULIC_STATUS_CODES.len() {
                    return Err(DiagnosticsError::Internal(format!(
                        "hydraulic model produced {} outputs, expected {}",
                        scores.len(),
                        HYDRAULIC_STATUS_CODES.len()
                    )));
                }
                let best = scores
                    .iter()
                    .enumerate()
                    .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(idx, _)| idx)
                    .unwrap_or(0);
                Ok(RawOutput::Ordinal(HYDRAULIC_STATUS_CODES[best].0))
            }
            MachineClass::Pump => unreachable!("pump resolves to motor"),
        }
    }

    /// Normalize into the uniform health shape
    pub fn normalize(&self) -> HealthResult {
        match *self {
            RawOutput::Regression(value) => HealthResult::Value {
                predicted_value: round2(value),
            },
            RawOutput::Binary { p_at_risk } => {
                let status = if p_at_risk >= 0.5 { "At Risk" } else { "Normal" };
                HealthResult::Status {
                    status: status.to_string(),
                    health_score: format!("{:.2}", (1.0 - p_at_risk) * 100.0),
                }
            }
            RawOutput::Ordinal(code) => HealthResult::Status {
                status: hydraulic_status(code).to_string(),
                // Direct numeric complement of the severity code, not a
                // probability; codes above 100 go negative and are
                // reported as-is.
                health_score: format!("{:.2}", 100.0 - f64::from(code)),
            },
        }
    }
}

/// Predict health for `class` from an external feature payload
///
/// Fails with `ModelUnavailable` when the registry reports the class's model
/// absent, and with `MalformedInput` before any model call when the payload
/// is invalid.
pub fn predict(
    registry: &ModelRegistry,
    class: MachineClass,
    features: &FeatureVector,
) -> Result<HealthResult, DiagnosticsError> {
    let row = schema::adapt(class, features)?;
    let handle = registry
        .handle(class)
        .ok_or(DiagnosticsError::ModelUnavailable(class))?;

    let scores = handle.run(&row.values).map_err(DiagnosticsError::internal)?;
    let raw = RawOutput::from_scores(class, &scores)?;
    debug!(machine = %class, raw = ?raw, "Raw model output interpreted");

    Ok(raw.normalize())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;
    use crate::types::BatteryFeatures;

    #[test]
    fn test_regression_rounds_to_two_decimals() {
        let result = RawOutput::Regression(112.3749).normalize();
        assert_eq!(result, HealthResult::Value { predicted_value: 112.37 });
    }

    #[test]
    fn test_binary_status_and_score_are_consistent() {
        // P(At Risk) just over the decision boundary
        let at_risk = RawOutput::Binary { p_at_risk: 0.73 }.normalize();
        match at_risk {
            HealthResult::Status { status, health_score } => {
                assert_eq!(status, "At Risk");
                assert_eq!(health_score, "27.00");
                assert!(health_score.parse::<f64>().unwrap() < 50.0);
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let normal = RawOutput::Binary { p_at_risk: 0.08 }.normalize();
        match normal {
            HealthResult::Status { status, health_score } => {
                assert_eq!(status, "Normal");
                assert_eq!(health_score, "92.00");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_boundary_probability_is_at_risk() {
        let result = RawOutput::Binary { p_at_risk: 0.5 }.normalize();
        match result {
            HealthResult::Status { status, .. } => assert_eq!(status, "At Risk"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_hydraulic_score_complements_code() {
        for (code, label) in HYDRAULIC_STATUS_CODES {
            let result = RawOutput::Ordinal(code).normalize();
            match result {
                HealthResult::Status { status, health_score } => {
                    assert_eq!(status, label);
                    let score: f64 = health_score.parse().unwrap();
                    assert_eq!(score + f64::from(code), 100.0);
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }

    #[test]
    fn test_unknown_hydraulic_code_maps_to_unknown_condition() {
        let result = RawOutput::Ordinal(42).normalize();
        match result {
            HealthResult::Status { status, health_score } => {
                assert_eq!(status, "Unknown Condition");
                assert_eq!(health_score, "58.00");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_code_above_100_goes_negative_unclamped() {
        let result = RawOutput::Ordinal(130).normalize();
        match result {
            HealthResult::Status { health_score, .. } => assert_eq!(health_score, "-30.00"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_hydraulic_argmax_picks_highest_score() {
        let raw = RawOutput::from_scores(MachineClass::Hydraulic, &[0.1, 0.7, 0.2]).unwrap();
        assert_eq!(raw, RawOutput::Ordinal(20));
    }

    #[test]
    fn test_absent_model_is_a_typed_failure() {
        let registry = ModelRegistry::empty();
        let features = FeatureVector::Battery(BatteryFeatures {
            cycle: 10.0,
            capacity: 1.85,
            temp_mean: 24.0,
            voltage_mean: 3.7,
            current_mean: -1.2,
            degradation_anomaly_score: 0.01,
        });
        let err = predict(&registry, MachineClass::Battery, &features).unwrap_err();
        assert_eq!(err.to_string(), "Battery model not loaded.");
    }

    #[test]
    fn test_malformed_input_fails_before_model_lookup() {
        // Registry is empty; a malformed payload must still be reported as
        // malformed, not as an unavailable model.
        let registry = ModelRegistry::empty();
        let features = FeatureVector::Battery(BatteryFeatures {
            cycle: f64::NAN,
            capacity: 1.85,
            temp_mean: 24.0,
            voltage_mean: 3.7,
            current_mean: -1.2,
            degradation_anomaly_score: 0.01,
        });
        let err = predict(&registry, MachineClass::Battery, &features).unwrap_err();
        assert!(matches!(err, DiagnosticsError::MalformedInput { .. }));
    }
}
