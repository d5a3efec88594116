//! Drift, cluster and smoothing visualization commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, DriftResponse, SmoothedPoint};
use crate::output::{print_error, print_info, print_warning, OutputFormat};

/// Row for the drift histogram table
#[derive(Tabled)]
struct DriftRow {
    #[tabled(rename = "Bin start")]
    bin_start: String,
    #[tabled(rename = "Training")]
    original: u64,
    #[tabled(rename = "Live")]
    live: u64,
}

/// Row for the smoothing demo table
#[derive(Tabled)]
struct SmoothedRow {
    #[tabled(rename = "Step")]
    step: usize,
    #[tabled(rename = "Raw")]
    raw: String,
    #[tabled(rename = "Moving avg")]
    moving_average: String,
    #[tabled(rename = "Kalman")]
    kalman: String,
}

/// Fetch and render a drift comparison for one machine type
pub async fn show_drift(client: &ApiClient, machine: &str, format: OutputFormat) -> Result<()> {
    let response: DriftResponse = client.get(&format!("drift-analysis/{machine}")).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            if let Some(error) = &response.error {
                print_error(error);
                return Ok(());
            }

            let rows: Vec<DriftRow> = response
                .data
                .iter()
                .map(|bin| DriftRow {
                    bin_start: format!("{:.3}", bin.bin_start),
                    original: bin.original_count,
                    live: bin.live_count,
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\n{} bins over the shared range", response.data.len());
        }
    }

    Ok(())
}

/// Fetch and render fleet cluster assignments
pub async fn show_clusters(client: &ApiClient, machine: &str, format: OutputFormat) -> Result<()> {
    let response: serde_json::Value = client.get(&format!("fleet-clusters/{machine}")).await?;

    if let Some(error) = response.get("error").and_then(|e| e.as_str()) {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
            OutputFormat::Table => print_error(error),
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            // Cluster records are schemaless CSV rows; table output prints a
            // summary instead of a full dump
            let records = response.as_array().map(Vec::as_slice).unwrap_or_default();
            if records.is_empty() {
                print_warning("No cluster records returned");
                return Ok(());
            }
            print_info(&format!(
                "{} cluster records for '{}' (use --format json for full records)",
                records.len(),
                machine
            ));
            if let Some(first) = records.first().and_then(|r| r.as_object()) {
                let columns: Vec<&str> = first.keys().map(String::as_str).collect();
                println!("Columns: {}", columns.join(", "));
            }
        }
    }

    Ok(())
}

/// Fetch and render a smoothing demonstration series
pub async fn show_smoothing(client: &ApiClient, demo: &str, format: OutputFormat) -> Result<()> {
    let samples: Vec<SmoothedPoint> = client.get(&format!("visualize/{demo}")).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&samples)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            let rows: Vec<SmoothedRow> = samples
                .iter()
                .map(|sample| SmoothedRow {
                    step: sample.time_step,
                    raw: format!("{:.2}", sample.raw),
                    moving_average: sample
                        .moving_average
                        .map(|v| format!("{v:.2}"))
                        .unwrap_or_else(|| "-".to_string()),
                    kalman: sample
                        .kalman_estimate
                        .map(|v| format!("{v:.2}"))
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
        }
    }

    Ok(())
}
