//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::types::{MediumUpgradeType, NearbyMedium, PayloadType};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory if present.
    ///
    /// Returns whether a file was loaded. Variables already set in the
    /// process environment are not overwritten.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    /// Load a specific env file if it exists
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path).map_err(|e| {
            AppError::config(format!("Failed to load env file {}: {}", path.display(), e))
        })?;

        Ok(true)
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# Nearby Connections Quick-Start Metrics Configuration
#
# Values here seed the test parameters. Environment variables already set
# in the shell take precedence, and command-line arguments override both.

# Name used to tag the run in reports
# NC_TEST_REPORT_ALIAS_NAME=unspecified

# Abort the run on the first failed trial (true/false)
# NC_FAST_FAIL_ON_ANY_ERROR=false

# WiFi network used for WLAN trials
# NC_WIFI_COUNTRY_CODE=US
# NC_WIFI_SSID=
# NC_WIFI_PASSWORD=

# Toggle airplane mode on the target side before each trial (true/false)
# NC_TOGGLE_AIRPLANE_MODE_TARGET_SIDE=true

# Disconnect WiFi once the run completes (true/false)
# NC_DISCONNECT_WIFI_AFTER_TEST=false

# Throughput benchmarks in KB/s and the percentile compared against them
# NC_BT_THROUGHPUT_BENCHMARK_KBS=10.0
# NC_BT_THROUGHPUT_PERCENTILE=95
# NC_WIFI_THROUGHPUT_BENCHMARK_KBS=10240.0
# NC_WIFI_THROUGHPUT_PERCENTILE=95

# Payload used for throughput measurement (FILE or STREAM)
# NC_PAYLOAD_TYPE=STREAM

# Medium requested for the upgraded connection, by name or code
# NC_UPGRADE_MEDIUM=UPGRADE_TO_ALL_WIFI

# How the upgrade is carried out (DEFAULT, DISRUPTIVE, NON_DISRUPTIVE)
# NC_MEDIUM_UPGRADE_TYPE=DEFAULT

# Acceptance targets as fractions in [0, 1]
# NC_SUCCESS_RATE_TARGET=0.98
# NC_REACH_RATE_TARGET=0.95
"#
        .to_string()
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();

        match key {
            "NC_TEST_REPORT_ALIAS_NAME" => {
                if value.is_empty() {
                    return Err(AppError::config("NC_TEST_REPORT_ALIAS_NAME cannot be empty"));
                }
            }
            "NC_FAST_FAIL_ON_ANY_ERROR"
            | "NC_TOGGLE_AIRPLANE_MODE_TARGET_SIDE"
            | "NC_DISCONNECT_WIFI_AFTER_TEST" => {
                value
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "NC_WIFI_COUNTRY_CODE" => {
                if !value.is_empty() && (value.len() != 2 || !value.chars().all(|c| c.is_ascii_alphabetic())) {
                    return Err(AppError::config(format!(
                        "NC_WIFI_COUNTRY_CODE must be a two-letter code, got: {}",
                        value
                    )));
                }
            }
            "NC_BT_THROUGHPUT_BENCHMARK_KBS" | "NC_WIFI_THROUGHPUT_BENCHMARK_KBS" => {
                let kbs: f64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if !kbs.is_finite() || kbs < 0.0 {
                    return Err(AppError::config(format!(
                        "{} must be a non-negative number, got: {}",
                        key, value
                    )));
                }
            }
            "NC_BT_THROUGHPUT_PERCENTILE" | "NC_WIFI_THROUGHPUT_PERCENTILE" => {
                let percentile: u8 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if percentile > 100 {
                    return Err(AppError::config(format!(
                        "{} must be between 0 and 100, got: {}",
                        key, percentile
                    )));
                }
            }
            "NC_SUCCESS_RATE_TARGET" | "NC_REACH_RATE_TARGET" => {
                let rate: f64 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if !(0.0..=1.0).contains(&rate) {
                    return Err(AppError::config(format!(
                        "{} must be between 0.0 and 1.0, got: {}",
                        key, value
                    )));
                }
            }
            "NC_PAYLOAD_TYPE" => {
                value.parse::<PayloadType>().map_err(|e| AppError::config(e.to_string()))?;
            }
            "NC_UPGRADE_MEDIUM" => {
                value.parse::<NearbyMedium>().map_err(|e| AppError::config(e.to_string()))?;
            }
            "NC_MEDIUM_UPGRADE_TYPE" => {
                value
                    .parse::<MediumUpgradeType>()
                    .map_err(|e| AppError::config(e.to_string()))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("NC_TEST_REPORT_ALIAS_NAME", "Name used to tag the run in reports", "lab-a"),
            ("NC_FAST_FAIL_ON_ANY_ERROR", "Abort on the first failed trial", "false"),
            ("NC_WIFI_COUNTRY_CODE", "Two-letter WiFi country code", "US"),
            ("NC_WIFI_SSID", "WiFi network name", "lab-network"),
            ("NC_WIFI_PASSWORD", "WiFi network password", "secret"),
            ("NC_TOGGLE_AIRPLANE_MODE_TARGET_SIDE", "Toggle airplane mode before each trial", "true"),
            ("NC_DISCONNECT_WIFI_AFTER_TEST", "Disconnect WiFi after the run", "false"),
            ("NC_BT_THROUGHPUT_BENCHMARK_KBS", "Minimum BT throughput in KB/s", "10.0"),
            ("NC_BT_THROUGHPUT_PERCENTILE", "Percentile compared against the BT benchmark (0-100)", "95"),
            ("NC_WIFI_THROUGHPUT_BENCHMARK_KBS", "Minimum WiFi throughput in KB/s", "10240.0"),
            ("NC_WIFI_THROUGHPUT_PERCENTILE", "Percentile compared against the WiFi benchmark (0-100)", "95"),
            ("NC_PAYLOAD_TYPE", "Payload used for throughput (FILE, STREAM)", "STREAM"),
            ("NC_UPGRADE_MEDIUM", "Medium requested for the upgraded connection", "UPGRADE_TO_ALL_WIFI"),
            ("NC_MEDIUM_UPGRADE_TYPE", "How the upgrade is carried out", "DEFAULT"),
            ("NC_SUCCESS_RATE_TARGET", "Required share of latencies under timeout (0-1)", "0.98"),
            ("NC_REACH_RATE_TARGET", "Required share of expected events observed (0-1)", "0.95"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<36} {}\n", var, description));
            help.push_str(&format!("  {:<36} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Parameters file (--params)\n");
        help.push_str("  5. Default values\n");

        help
    }
}
