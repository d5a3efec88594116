//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Color a machine status or health state based on its value
pub fn color_status(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "normal" | "optimal efficiency" | "healthy" | "success" => status.green().to_string(),
        "reduced efficiency" | "degraded" | "warning" => status.yellow().to_string(),
        "at risk" | "close to total failure" | "unhealthy" | "error" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Color a 0-100 health score
pub fn color_health_score(score: &str) -> String {
    match score.parse::<f64>() {
        Ok(value) if value >= 75.0 => score.green().to_string(),
        Ok(value) if value >= 50.0 => score.yellow().to_string(),
        Ok(_) => score.red().to_string(),
        Err(_) => score.to_string(),
    }
}

/// Format a signed attribution value with a direction marker
pub fn format_importance(importance: f64) -> String {
    if importance > 0.0 {
        format!("+{:.4}", importance).red().to_string()
    } else {
        format!("{:.4}", importance).green().to_string()
    }
}
