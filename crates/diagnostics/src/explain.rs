//! Feature attribution for motor predictions
//!
//! Baseline-substitution attribution: each feature's importance is the change
//! in a class probability caused by replacing that feature with its baseline
//! reference value while the others stay fixed. This yields a per-feature,
//! per-class contribution tensor; callers pick the class column they care
//! about through a named accessor rather than a bare index.

use crate::error::DiagnosticsError;
use crate::registry::ModelHandle;
use crate::schema::{self, AdaptedRow};
use crate::types::{FeatureAttribution, FeatureVector, MachineClass};
use std::sync::Arc;
use tracing::debug;

/// Fallback baseline: column means of the motor training set, used when the
/// reference dataset is not readable at startup. Order matches
/// [`crate::schema::MOTOR_COLUMNS`].
pub const DEFAULT_MOTOR_BASELINE: [f64; 5] = [300.0, 310.0, 1538.8, 40.0, 108.0];

/// Index of the "At Risk" class in the motor model's probability vector
const AT_RISK_CLASS: usize = 1;

/// Per-feature, per-class probability contributions
///
/// Row order follows the model's column order; column order follows the
/// model's class order.
#[derive(Debug, Clone)]
pub struct ContributionTensor {
    features: Vec<&'static str>,
    contributions: Vec<Vec<f64>>,
}

impl ContributionTensor {
    /// Contributions toward the positive ("At Risk") class, one per feature
    pub fn at_risk_contributions(&self) -> Vec<(&'static str, f64)> {
        self.features
            .iter()
            .zip(&self.contributions)
            .map(|(feature, row)| (*feature, row.get(AT_RISK_CLASS).copied().unwrap_or(0.0)))
            .collect()
    }
}

/// Motor attribution model: the classifier handle plus a baseline row
pub struct AttributionModel {
    handle: Arc<ModelHandle>,
    baseline: Vec<f64>,
}

impl AttributionModel {
    pub fn new(handle: Arc<ModelHandle>, baseline: Vec<f64>) -> Self {
        Self { handle, baseline }
    }

    /// Contribution tensor for a single adapted row
    fn contributions(&self, row: &AdaptedRow) -> Result<ContributionTensor, DiagnosticsError> {
        let actual = self
            .handle
            .run(&row.values)
            .map_err(DiagnosticsError::internal)?;

        let mut contributions = Vec::with_capacity(row.values.len());
        for (idx, baseline_value) in self.baseline.iter().enumerate() {
            let mut substituted = row.values.clone();
            substituted[idx] = *baseline_value;
            let counterfactual = self
                .handle
                .run(&substituted)
                .map_err(DiagnosticsError::internal)?;
            // Positive contribution means the observed value pushes the
            // class probability above its baseline level.
            let per_class = actual
                .iter()
                .zip(&counterfactual)
                .map(|(a, c)| a - c)
                .collect();
            contributions.push(per_class);
        }

        Ok(ContributionTensor {
            features: row.columns.clone(),
            contributions,
        })
    }

    /// At-risk attributions for a motor payload, sorted descending
    pub fn explain(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<FeatureAttribution>, DiagnosticsError> {
        let row = schema::adapt(MachineClass::Motor, features)?;
        if self.baseline.len() != row.values.len() {
            return Err(DiagnosticsError::Internal(format!(
                "baseline has {} entries, expected {}",
                self.baseline.len(),
                row.values.len()
            )));
        }

        let tensor = self.contributions(&row)?;
        let mut attributions: Vec<FeatureAttribution> = tensor
            .at_risk_contributions()
            .into_iter()
            .map(|(feature, importance)| FeatureAttribution {
                feature: feature.to_string(),
                importance,
            })
            .collect();
        attributions.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(features = attributions.len(), "Attribution computed");
        Ok(attributions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_risk_accessor_selects_positive_class_column() {
        let tensor = ContributionTensor {
            features: vec!["Torque [Nm]", "Tool wear [min]"],
            contributions: vec![vec![-0.12, 0.12], vec![0.03, -0.03]],
        };
        let at_risk = tensor.at_risk_contributions();
        assert_eq!(at_risk, vec![("Torque [Nm]", 0.12), ("Tool wear [min]", -0.03)]);
    }

    #[test]
    fn test_default_baseline_matches_motor_width() {
        assert_eq!(DEFAULT_MOTOR_BASELINE.len(), MachineClass::Motor.feature_count());
    }
}
