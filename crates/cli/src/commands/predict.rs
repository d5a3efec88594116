//! Prediction and explanation commands

use anyhow::{Context, Result};
use tabled::Tabled;

use crate::client::{ApiClient, AttributionEntry, PredictionResponse};
use crate::output::{
    color_health_score, color_status, format_importance, print_error, print_success, OutputFormat,
};

/// Row for the attribution table
#[derive(Tabled)]
struct AttributionRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Importance")]
    importance: String,
}

/// Request a prediction and render the normalized health result
pub async fn predict(
    client: &ApiClient,
    machine: &str,
    payload: serde_json::Value,
    format: OutputFormat,
) -> Result<()> {
    let response: PredictionResponse = client
        .post(&format!("predict/{machine}"), &payload)
        .await?;

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

            if let Some(value) = response.predicted_value {
                print_success(&format!("Predicted remaining useful life: {value} cycles"));
            }
            if let Some(status) = &response.status {
                println!("Status: {}", color_status(status));
            }
            if let Some(score) = &response.health_score {
                println!("Health score: {}", color_health_score(score));
            }
        }
    }

    Ok(())
}

/// Load a hydraulic sensor snapshot from a JSON file and predict
pub async fn predict_hydraulic_from_file(
    client: &ApiClient,
    input: &str,
    format: OutputFormat,
) -> Result<()> {
    let contents = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file {input}"))?;
    let payload: serde_json::Value =
        serde_json::from_str(&contents).context("Input file is not valid JSON")?;

    predict(client, "hydraulic", payload, format).await
}

/// Request motor feature attributions and render them ranked
pub async fn explain_motor(
    client: &ApiClient,
    payload: serde_json::Value,
    format: OutputFormat,
) -> Result<()> {
    // The endpoint returns either a ranked array or an error object
    let response: serde_json::Value = client.post("explain/motor", &payload).await?;

    if let Some(error) = response.get("error").and_then(|e| e.as_str()) {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
            OutputFormat::Table => print_error(error),
        }
        return Ok(());
    }

    let attributions: Vec<AttributionEntry> =
        serde_json::from_value(response).context("Failed to parse attribution response")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&attributions)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            let rows: Vec<AttributionRow> = attributions
                .iter()
                .map(|entry| AttributionRow {
                    feature: entry.feature.clone(),
                    importance: format_importance(entry.importance),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!("\nPositive importance pushes the prediction toward \"At Risk\"");
        }
    }

    Ok(())
}
