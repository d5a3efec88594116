//! Feature schema adaptation
//!
//! Maps external, snake_case feature names onto the column names each
//! predictive model was trained with. The motor model expects display-form
//! names with units; its renaming table is static, exhaustive, and bijective.
//! Battery and hydraulic schemas need no renaming, so adaptation is the
//! identity there. Adaptation only relabels; it never drops, invents, or
//! coerces values.

use crate::error::DiagnosticsError;
use crate::types::{FeatureVector, MachineClass};

/// Motor renaming table, in model column order: (external, model column)
pub const MOTOR_COLUMNS: [(&str, &str); 5] = [
    ("air_temperature_k", "Air temperature [K]"),
    ("process_temperature_k", "Process temperature [K]"),
    ("rotational_speed_rpm", "Rotational speed [rpm]"),
    ("torque_nm", "Torque [Nm]"),
    ("tool_wear_min", "Tool wear [min]"),
];

/// A feature row reshaped to what the model expects
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedRow {
    /// Model column names, in model order
    pub columns: Vec<&'static str>,
    /// Values in the same order
    pub values: Vec<f64>,
}

/// Model column name for an external field, if the class renames it
pub fn internal_name(class: MachineClass, external: &str) -> Option<&'static str> {
    match class.model_class() {
        MachineClass::Motor => MOTOR_COLUMNS
            .iter()
            .find(|(ext, _)| *ext == external)
            .map(|(_, int)| *int),
        _ => None,
    }
}

/// External field name for a model column; inverse of [`internal_name`]
pub fn external_name(class: MachineClass, internal: &str) -> Option<&'static str> {
    match class.model_class() {
        MachineClass::Motor => MOTOR_COLUMNS
            .iter()
            .find(|(_, int)| *int == internal)
            .map(|(ext, _)| *ext),
        _ => None,
    }
}

/// Reshape an external feature payload into the row `class`'s model expects
///
/// Fails with `MalformedInput` when the payload belongs to a different
/// machine class or contains non-finite values.
pub fn adapt(class: MachineClass, features: &FeatureVector) -> Result<AdaptedRow, DiagnosticsError> {
    if features.class() != class.model_class() {
        return Err(DiagnosticsError::MalformedInput {
            field: "machine_type".to_string(),
            message: format!(
                "{} features cannot be used for a {} prediction",
                features.class(),
                class
            ),
        });
    }
    features.validate()?;

    let fields = features.fields();
    let columns = fields
        .iter()
        .map(|(external, _)| internal_name(class, external).unwrap_or(external))
        .collect();
    let values = fields.iter().map(|(_, value)| *value).collect();

    Ok(AdaptedRow { columns, values })
}
