//! Command-line interface

use crate::output::OutputFormat;
use crate::types::NearbyMedium;
use clap::Parser;
use std::path::PathBuf;

/// Evaluate quick-start trial results against throughput and latency targets
#[derive(Parser, Debug, Clone)]
#[command(name = "ncperf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON file holding an array of trial results
    #[arg(long, value_name = "FILE", required_unless_present_any = ["env_help", "create_env_example"])]
    pub trials: Option<PathBuf>,

    /// JSON file with test parameters (applied before environment variables)
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Medium requested for the upgraded connection (name or code)
    #[arg(long, value_parser = parse_medium)]
    pub medium: Option<NearbyMedium>,

    /// BT throughput benchmark in KB/s
    #[arg(long, value_name = "KBS")]
    pub bt_benchmark: Option<f64>,

    /// WiFi throughput benchmark in KB/s
    #[arg(long, value_name = "KBS")]
    pub wifi_benchmark: Option<f64>,

    /// Percentile of BT throughput compared against its benchmark
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub bt_percentile: Option<u8>,

    /// Percentile of WiFi throughput compared against its benchmark
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub wifi_percentile: Option<u8>,

    /// Required share of latency samples under their timeout (0.0-1.0)
    #[arg(long, value_parser = parse_fraction)]
    pub success_target: Option<f64>,

    /// Required share of expected events that produced a sample (0.0-1.0)
    #[arg(long, value_parser = parse_fraction)]
    pub reach_target: Option<f64>,

    /// Report alias name
    #[arg(long)]
    pub alias: Option<String>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// List the supported NC_* environment variables and exit
    #[arg(long)]
    pub env_help: bool,

    /// Write an example .env file to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with = "env_help")]
    pub create_env_example: Option<PathBuf>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(ref alias) = self.alias {
            if alias.trim().is_empty() {
                return Err("--alias cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

fn parse_medium(s: &str) -> Result<NearbyMedium, String> {
    s.parse::<NearbyMedium>().map_err(|e| e.to_string())
}

/// Parse a rate target in [0, 1]
fn parse_fraction(s: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid fraction: {}", s))?;

    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("Fraction must be between 0.0 and 1.0, got: {}", s))
    }
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}
