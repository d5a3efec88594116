//! Core data models for the diagnostics service

use crate::error::DiagnosticsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Machine classes served by the platform
///
/// `Pump` is an alias class: it reuses the motor model and the motor
/// reference dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineClass {
    Battery,
    Motor,
    Hydraulic,
    Pump,
}

impl MachineClass {
    /// The class whose model actually serves requests for `self`
    pub fn model_class(self) -> Self {
        match self {
            MachineClass::Pump => MachineClass::Motor,
            other => other,
        }
    }

    /// Number of input columns the class's model expects
    pub fn feature_count(self) -> usize {
        match self.model_class() {
            MachineClass::Battery => 6,
            MachineClass::Motor => 5,
            MachineClass::Hydraulic => 16,
            MachineClass::Pump => unreachable!("pump resolves to motor"),
        }
    }

    /// Lowercase wire name, as it appears in URLs and dataset keys
    pub fn wire_name(self) -> &'static str {
        match self {
            MachineClass::Battery => "battery",
            MachineClass::Motor => "motor",
            MachineClass::Hydraulic => "hydraulic",
            MachineClass::Pump => "pump",
        }
    }
}

impl fmt::Display for MachineClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MachineClass::Battery => "Battery",
            MachineClass::Motor => "Motor",
            MachineClass::Hydraulic => "Hydraulic",
            MachineClass::Pump => "Pump",
        };
        f.write_str(name)
    }
}

impl FromStr for MachineClass {
    type Err = DiagnosticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "battery" => Ok(MachineClass::Battery),
            "motor" => Ok(MachineClass::Motor),
            "hydraulic" => Ok(MachineClass::Hydraulic),
            "pump" => Ok(MachineClass::Pump),
            _ => Err(DiagnosticsError::UnknownMachineClass(s.to_string())),
        }
    }
}

/// Battery input features (RUL regression)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryFeatures {
    pub cycle: f64,
    pub capacity: f64,
    pub temp_mean: f64,
    pub voltage_mean: f64,
    pub current_mean: f64,
    pub degradation_anomaly_score: f64,
}

impl BatteryFeatures {
    /// External field names and values, in model column order
    pub fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("cycle", self.cycle),
            ("capacity", self.capacity),
            ("temp_mean", self.temp_mean),
            ("voltage_mean", self.voltage_mean),
            ("current_mean", self.current_mean),
            ("degradation_anomaly_score", self.degradation_anomaly_score),
        ]
    }
}

/// Motor input features (binary failure classification)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotorFeatures {
    pub air_temperature_k: f64,
    pub process_temperature_k: f64,
    pub rotational_speed_rpm: f64,
    pub torque_nm: f64,
    pub tool_wear_min: f64,
}

impl MotorFeatures {
    pub fn fields(&self) -> [(&'static str, f64); 5] {
        [
            ("air_temperature_k", self.air_temperature_k),
            ("process_temperature_k", self.process_temperature_k),
            ("rotational_speed_rpm", self.rotational_speed_rpm),
            ("torque_nm", self.torque_nm),
            ("tool_wear_min", self.tool_wear_min),
        ]
    }
}

/// Hydraulic rig sensor snapshot (ordinal severity classification)
///
/// Field names follow the sensor labels of the hydraulic condition
/// monitoring dataset and are part of the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraulicFeatures {
    #[serde(rename = "PS1")]
    pub ps1: f64,
    #[serde(rename = "PS2")]
    pub ps2: f64,
    #[serde(rename = "PS3")]
    pub ps3: f64,
    #[serde(rename = "PS4")]
    pub ps4: f64,
    #[serde(rename = "PS5")]
    pub ps5: f64,
    #[serde(rename = "PS6")]
    pub ps6: f64,
    #[serde(rename = "EPS1")]
    pub eps1: f64,
    #[serde(rename = "FS1")]
    pub fs1: f64,
    #[serde(rename = "TS1")]
    pub ts1: f64,
    #[serde(rename = "TS2")]
    pub ts2: f64,
    #[serde(rename = "TS3")]
    pub ts3: f64,
    #[serde(rename = "TS4")]
    pub ts4: f64,
    #[serde(rename = "VS1")]
    pub vs1: f64,
    #[serde(rename = "CE")]
    pub ce: f64,
    #[serde(rename = "CP")]
    pub cp: f64,
    #[serde(rename = "SE")]
    pub se: f64,
}

impl HydraulicFeatures {
    pub fn fields(&self) -> [(&'static str, f64); 16] {
        [
            ("PS1", self.ps1),
            ("PS2", self.ps2),
            ("PS3", self.ps3),
            ("PS4", self.ps4),
            ("PS5", self.ps5),
            ("PS6", self.ps6),
            ("EPS1", self.eps1),
            ("FS1", self.fs1),
            ("TS1", self.ts1),
            ("TS2", self.ts2),
            ("TS3", self.ts3),
            ("TS4", self.ts4),
            ("VS1", self.vs1),
            ("CE", self.ce),
            ("CP", self.cp),
            ("SE", self.se),
        ]
    }
}

/// A class-tagged feature payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureVector {
    Battery(BatteryFeatures),
    Motor(MotorFeatures),
    Hydraulic(HydraulicFeatures),
}

impl FeatureVector {
    /// The machine class this payload belongs to
    pub fn class(&self) -> MachineClass {
        match self {
            FeatureVector::Battery(_) => MachineClass::Battery,
            FeatureVector::Motor(_) => MachineClass::Motor,
            FeatureVector::Hydraulic(_) => MachineClass::Hydraulic,
        }
    }

    /// External field names and values, in model column order
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        match self {
            FeatureVector::Battery(f) => f.fields().to_vec(),
            FeatureVector::Motor(f) => f.fields().to_vec(),
            FeatureVector::Hydraulic(f) => f.fields().to_vec(),
        }
    }

    /// Reject non-finite values before anything reaches a model
    pub fn validate(&self) -> Result<(), DiagnosticsError> {
        for (name, value) in self.fields() {
            if !value.is_finite() {
                return Err(DiagnosticsError::MalformedInput {
                    field: name.to_string(),
                    message: format!("value {value} is not a finite number"),
                });
            }
        }
        Ok(())
    }
}

/// Normalized prediction result
///
/// Battery predictions carry a continuous value; motor and hydraulic
/// predictions carry a status label and a health score formatted to two
/// decimals. The health score is always a complement of a risk or severity
/// quantity, never computed independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HealthResult {
    Value { predicted_value: f64 },
    Status { status: String, health_score: String },
}

/// One feature's signed contribution toward the "At Risk" outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub importance: f64,
}

/// One histogram bin of the drift comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftBin {
    pub bin_start: f64,
    pub original_count: u64,
    pub live_count: u64,
}

/// Drift comparison over a machine's reference feature column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub status: String,
    pub data: Vec<DriftBin>,
}

/// One time step of a denoising demonstration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedSample {
    pub time_step: usize,
    pub raw: f64,
    pub moving_average: Option<f64>,
    pub kalman_estimate: Option<f64>,
}
