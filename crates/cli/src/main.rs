//! SmartPredict CLI
//!
//! A command-line tool for querying machine health predictions, drift
//! reports, and diagnostics from a running SmartPredict service.

mod client;
mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{diagnostics, predict, service};

/// SmartPredict Maintenance CLI
#[derive(Parser)]
#[command(name = "smartpredict")]
#[command(author, version, about = "CLI for the SmartPredict maintenance service", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via SMARTPREDICT_API_URL env var)
    #[arg(long, env = "SMARTPREDICT_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict machine health from sensor features
    #[command(subcommand)]
    Predict(PredictCommands),

    /// Explain which features drive a motor prediction
    Explain {
        /// Air temperature in Kelvin
        #[arg(long)]
        air_temperature_k: f64,

        /// Process temperature in Kelvin
        #[arg(long)]
        process_temperature_k: f64,

        /// Rotational speed in rpm
        #[arg(long)]
        rotational_speed_rpm: f64,

        /// Torque in Nm
        #[arg(long)]
        torque_nm: f64,

        /// Tool wear in minutes
        #[arg(long)]
        tool_wear_min: f64,
    },

    /// Show drift analysis for a machine type
    Drift {
        /// Machine type (battery, motor, hydraulic, pump)
        machine: String,
    },

    /// Show fleet cluster assignments for a machine type
    Clusters {
        /// Machine type (battery or motor)
        machine: String,
    },

    /// Show signal smoothing demonstrations
    #[command(subcommand)]
    Visualize(VisualizeCommands),

    /// Kick off a simulated retraining pipeline
    Retrain {
        /// Machine type to retrain
        machine: String,
    },

    /// Show service health and readiness
    Status,
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Battery remaining-useful-life prediction
    Battery {
        /// Charge cycle number
        #[arg(long)]
        cycle: f64,

        /// Measured capacity in Ah
        #[arg(long)]
        capacity: f64,

        /// Mean temperature over the cycle
        #[arg(long)]
        temp_mean: f64,

        /// Mean voltage over the cycle
        #[arg(long)]
        voltage_mean: f64,

        /// Mean current over the cycle
        #[arg(long)]
        current_mean: f64,

        /// Degradation anomaly score
        #[arg(long)]
        degradation_anomaly_score: f64,
    },

    /// Motor failure-risk prediction
    Motor {
        /// Air temperature in Kelvin
        #[arg(long)]
        air_temperature_k: f64,

        /// Process temperature in Kelvin
        #[arg(long)]
        process_temperature_k: f64,

        /// Rotational speed in rpm
        #[arg(long)]
        rotational_speed_rpm: f64,

        /// Torque in Nm
        #[arg(long)]
        torque_nm: f64,

        /// Tool wear in minutes
        #[arg(long)]
        tool_wear_min: f64,
    },

    /// Hydraulic rig condition prediction
    Hydraulic {
        /// Path to a JSON file with the 16 hydraulic sensor readings
        #[arg(long, short)]
        input: String,
    },
}

#[derive(Subcommand)]
pub enum VisualizeCommands {
    /// Moving-average smoothing of a noisy sine signal
    NoiseFilter,

    /// Kalman filter versus moving average on a rising trend
    KalmanFilter,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize client
    let client = client::ApiClient::new(&cli.api_url)?;

    // Execute command
    match cli.command {
        Commands::Predict(predict_cmd) => match predict_cmd {
            PredictCommands::Battery {
                cycle,
                capacity,
                temp_mean,
                voltage_mean,
                current_mean,
                degradation_anomaly_score,
            } => {
                let payload = serde_json::json!({
                    "cycle": cycle,
                    "capacity": capacity,
                    "temp_mean": temp_mean,
                    "voltage_mean": voltage_mean,
                    "current_mean": current_mean,
                    "degradation_anomaly_score": degradation_anomaly_score,
                });
                predict::predict(&client, "battery", payload, cli.format).await?;
            }
            PredictCommands::Motor {
                air_temperature_k,
                process_temperature_k,
                rotational_speed_rpm,
                torque_nm,
                tool_wear_min,
            } => {
                let payload = serde_json::json!({
                    "air_temperature_k": air_temperature_k,
                    "process_temperature_k": process_temperature_k,
                    "rotational_speed_rpm": rotational_speed_rpm,
                    "torque_nm": torque_nm,
                    "tool_wear_min": tool_wear_min,
                });
                predict::predict(&client, "motor", payload, cli.format).await?;
            }
            PredictCommands::Hydraulic { input } => {
                predict::predict_hydraulic_from_file(&client, &input, cli.format).await?;
            }
        },
        Commands::Explain {
            air_temperature_k,
            process_temperature_k,
            rotational_speed_rpm,
            torque_nm,
            tool_wear_min,
        } => {
            let payload = serde_json::json!({
                "air_temperature_k": air_temperature_k,
                "process_temperature_k": process_temperature_k,
                "rotational_speed_rpm": rotational_speed_rpm,
                "torque_nm": torque_nm,
                "tool_wear_min": tool_wear_min,
            });
            predict::explain_motor(&client, payload, cli.format).await?;
        }
        Commands::Drift { machine } => {
            diagnostics::show_drift(&client, &machine, cli.format).await?;
        }
        Commands::Clusters { machine } => {
            diagnostics::show_clusters(&client, &machine, cli.format).await?;
        }
        Commands::Visualize(vis_cmd) => match vis_cmd {
            VisualizeCommands::NoiseFilter => {
                diagnostics::show_smoothing(&client, "noise-filter", cli.format).await?;
            }
            VisualizeCommands::KalmanFilter => {
                diagnostics::show_smoothing(&client, "kalman-filter", cli.format).await?;
            }
        },
        Commands::Retrain { machine } => {
            service::retrain(&client, &machine, cli.format).await?;
        }
        Commands::Status => {
            service::show_status(&client, cli.format).await?;
        }
    }

    Ok(())
}
