//! Service configuration

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Directory holding the ONNX model artifacts
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Directory holding the reference datasets
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_api_port() -> u16 {
    8000
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            model_dir: default_model_dir(),
            data_dir: default_data_dir(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from SMARTPREDICT_* environment variables,
    /// falling back to defaults
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SMARTPREDICT"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}
