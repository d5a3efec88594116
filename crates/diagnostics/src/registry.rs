//! Model registry
//!
//! Loads the per-class predictive models once at startup. Loading is
//! best-effort: a class whose artifact is missing or unreadable is recorded
//! as absent without preventing the other classes (or the service) from
//! starting. Handles are immutable after construction and shared read-only
//! across requests.

use crate::dataset;
use crate::explain::{AttributionModel, DEFAULT_MOTOR_BASELINE};
use crate::schema::MOTOR_COLUMNS;
use crate::types::MachineClass;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tract_onnx::prelude::*;
use tracing::{info, warn};

/// Artifact file names inside the model directory
pub const BATTERY_MODEL_FILE: &str = "rul_predictor_model.onnx";
pub const MOTOR_MODEL_FILE: &str = "motor_model.onnx";
pub const HYDRAULIC_MODEL_FILE: &str = "hydraulic_model.onnx";

/// Motor reference dataset, also used for the explainer baseline
pub const MOTOR_DATASET_FILE: &str = "ai4i2020.csv";

type TractPlan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Where models and reference datasets live on disk
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    pub data_dir: PathBuf,
}

/// An opaque, read-only predictive model bound to one machine class
///
/// Thread-safe by construction: the tract plan is immutable and `run` takes
/// `&self`, so a handle can serve arbitrarily many concurrent requests.
pub struct ModelHandle {
    class: MachineClass,
    plan: TractPlan,
    n_features: usize,
    checksum: String,
}

impl ModelHandle {
    /// Load and optimize an ONNX artifact for `class`
    fn load(class: MachineClass, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        let checksum = hex::encode(Sha256::digest(&bytes));
        let n_features = class.feature_count();

        let plan = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(&bytes))
            .context("failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("failed to set input shape")?
            .into_optimized()
            .context("failed to optimize model")?
            .into_runnable()
            .context("failed to create runnable model")?;

        info!(
            machine = %class,
            path = %path.display(),
            size_bytes = bytes.len(),
            checksum = %checksum,
            "Model loaded"
        );

        Ok(Self {
            class,
            plan,
            n_features,
            checksum,
        })
    }

    pub fn class(&self) -> MachineClass {
        self.class
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Run the model on a single adapted row, returning its raw outputs
    pub fn run(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features {
            anyhow::bail!(
                "expected {} features for {}, got {}",
                self.n_features,
                self.class,
                row.len()
            );
        }

        let data: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .context("failed to shape input tensor")?
            .into();

        let result = self.plan.run(tvec!(input.into()))?;
        let output = result.first().context("no output from model")?;
        let view = output.to_array_view::<f32>()?;
        Ok(view.iter().map(|v| f64::from(*v)).collect())
    }
}

/// Per-class load status, reported at startup and through health checks
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoadReport {
    pub battery: bool,
    pub motor: bool,
    pub hydraulic: bool,
    pub explainer: bool,
}

impl LoadReport {
    /// Names of the model classes that failed to load
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.battery {
            missing.push("battery");
        }
        if !self.motor {
            missing.push("motor");
        }
        if !self.hydraulic {
            missing.push("hydraulic");
        }
        missing
    }

    pub fn any_loaded(&self) -> bool {
        self.battery || self.motor || self.hydraulic
    }
}

/// Holds the optional, independently-failable models plus the motor
/// attribution model
pub struct ModelRegistry {
    battery: Option<Arc<ModelHandle>>,
    motor: Option<Arc<ModelHandle>>,
    hydraulic: Option<Arc<ModelHandle>>,
    explainer: Option<AttributionModel>,
}

impl ModelRegistry {
    /// Load all models, best-effort; never fails
    pub fn load(config: &ModelConfig) -> Self {
        let battery = Self::load_one(MachineClass::Battery, &config.model_dir.join(BATTERY_MODEL_FILE));
        let motor = Self::load_one(MachineClass::Motor, &config.model_dir.join(MOTOR_MODEL_FILE));
        let hydraulic =
            Self::load_one(MachineClass::Hydraulic, &config.model_dir.join(HYDRAULIC_MODEL_FILE));

        // The attribution model rides on the motor handle; its absence only
        // affects explanation availability, never prediction.
        let explainer = motor.as_ref().map(|handle| {
            let baseline = Self::motor_baseline(&config.data_dir);
            AttributionModel::new(Arc::clone(handle), baseline)
        });
        match &explainer {
            Some(_) => info!("Attribution model ready for motor predictions"),
            None => warn!("Attribution model unavailable: motor model not loaded"),
        }

        Self {
            battery,
            motor,
            hydraulic,
            explainer,
        }
    }

    /// An empty registry with every model absent; prediction paths still
    /// work and report `ModelUnavailable`
    pub fn empty() -> Self {
        Self {
            battery: None,
            motor: None,
            hydraulic: None,
            explainer: None,
        }
    }

    fn load_one(class: MachineClass, path: &Path) -> Option<Arc<ModelHandle>> {
        match ModelHandle::load(class, path) {
            Ok(handle) => Some(Arc::new(handle)),
            Err(err) => {
                warn!(machine = %class, path = %path.display(), error = %err, "Model not loaded");
                None
            }
        }
    }

    /// Baseline row for the attribution model: column means of the motor
    /// reference dataset when readable, fixed training-set means otherwise
    fn motor_baseline(data_dir: &Path) -> Vec<f64> {
        let path = data_dir.join(MOTOR_DATASET_FILE);
        let means: Option<Vec<f64>> = MOTOR_COLUMNS
            .iter()
            .map(|(_, column)| dataset::column_mean(&path, column).ok())
            .collect();
        match means {
            Some(means) => {
                info!(path = %path.display(), "Explainer baseline computed from reference dataset");
                means
            }
            None => {
                info!("Explainer baseline falling back to training-set means");
                DEFAULT_MOTOR_BASELINE.to_vec()
            }
        }
    }

    /// The model serving `class`, if it loaded; `Pump` resolves to motor
    pub fn handle(&self, class: MachineClass) -> Option<&ModelHandle> {
        let slot = match class.model_class() {
            MachineClass::Battery => &self.battery,
            MachineClass::Motor => &self.motor,
            MachineClass::Hydraulic => &self.hydraulic,
            MachineClass::Pump => unreachable!("pump resolves to motor"),
        };
        slot.as_deref()
    }

    /// The attribution model, available only for the motor class
    pub fn attributor_for(&self, class: MachineClass) -> Option<&AttributionModel> {
        match class {
            MachineClass::Motor => self.explainer.as_ref(),
            _ => None,
        }
    }

    /// Per-class availability summary
    pub fn load_report(&self) -> LoadReport {
        LoadReport {
            battery: self.battery.is_some(),
            motor: self.motor.is_some(),
            hydraulic: self.hydraulic.is_some(),
            explainer: self.explainer.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn empty_config() -> (TempDir, ModelConfig) {
        let dir = TempDir::new().unwrap();
        let config = ModelConfig {
            model_dir: dir.path().join("models"),
            data_dir: dir.path().join("data"),
        };
        (dir, config)
    }

    #[test]
    fn test_registry_survives_missing_artifacts() {
        let (_dir, config) = empty_config();
        let registry = ModelRegistry::load(&config);
        let report = registry.load_report();

        assert!(!report.any_loaded());
        assert_eq!(report.missing(), vec!["battery", "motor", "hydraulic"]);
        assert!(registry.handle(MachineClass::Battery).is_none());
        assert!(registry.attributor_for(MachineClass::Motor).is_none());
    }

    #[test]
    fn test_registry_rejects_garbage_artifact_without_failing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MOTOR_MODEL_FILE), b"not an onnx model").unwrap();
        let config = ModelConfig {
            model_dir: dir.path().to_path_buf(),
            data_dir: dir.path().to_path_buf(),
        };

        let registry = ModelRegistry::load(&config);
        assert!(registry.handle(MachineClass::Motor).is_none());
        assert!(!registry.load_report().motor);
    }

    #[test]
    fn test_pump_and_motor_share_a_slot() {
        let registry = ModelRegistry::empty();
        assert!(registry.handle(MachineClass::Pump).is_none());
        assert!(registry.attributor_for(MachineClass::Pump).is_none());
    }
}
