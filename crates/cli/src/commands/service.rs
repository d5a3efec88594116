//! Service lifecycle and status commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, HealthResponse, ReadinessResponse, RetrainResponse};
use crate::output::{color_status, print_success, print_warning, OutputFormat};

/// Row for the component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
    #[tabled(rename = "Last check")]
    last_check: String,
}

/// Kick off a simulated retraining pipeline
pub async fn retrain(client: &ApiClient, machine: &str, format: OutputFormat) -> Result<()> {
    let response: RetrainResponse = client.get(&format!("retrain/{machine}")).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&response)?;
            println!("{}", json);
        }
        OutputFormat::Table => {
            print_success(&response.message);
        }
    }

    Ok(())
}

/// Show service health and readiness
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    // Probes answer 503 when degraded or not ready; the body still parses
    let health: HealthResponse = client.get_lenient("healthz").await?;
    let readiness: ReadinessResponse = client.get_lenient("readyz").await?;

    match format {
        OutputFormat::Json => {
            let combined = serde_json::json!({
                "health": health,
                "readiness": readiness,
            });
            println!("{}", serde_json::to_string_pretty(&combined)?);
        }
        OutputFormat::Table => {
            println!("Service status: {}", color_status(&health.status));
            if readiness.ready {
                print_success("Service is ready");
            } else {
                print_warning(&format!(
                    "Service not ready: {}",
                    readiness.reason.as_deref().unwrap_or("unknown")
                ));
            }

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    component: name.clone(),
                    status: color_status(&component.status),
                    detail: component.message.clone().unwrap_or_default(),
                    last_check: format_timestamp(component.last_check_timestamp),
                })
                .collect();
            rows.sort_by(|a, b| a.component.cmp(&b.component));

            if !rows.is_empty() {
                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}

/// Format a unix timestamp for display
fn format_timestamp(timestamp: i64) -> String {
    chrono::DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}
