//! Configuration validation utilities and rules

use crate::{
    error::Result,
    models::TestParameters,
    types::is_high_quality_medium,
};
use colored::*;

/// Configuration validator for settings that are legal but suspicious
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate parameters, then collect warnings for questionable settings
    pub fn validate_comprehensive(params: &TestParameters) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        params.validate()?;

        warnings.extend(Self::validate_wifi_settings(params));
        warnings.extend(Self::validate_benchmarks(params));
        warnings.extend(Self::validate_medium(params));

        Ok(warnings)
    }

    fn validate_wifi_settings(params: &TestParameters) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !params.wifi_password.is_empty() && params.wifi_ssid.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "WiFi password is set but no SSID is configured; the password will be ignored".to_string(),
            ));
        }

        if params.wifi_configured() && params.wifi_country_code.is_empty() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("WiFi SSID '{}' is configured without a country code", params.wifi_ssid),
            ));
        }

        warnings
    }

    fn validate_benchmarks(params: &TestParameters) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if params.wifi_transfer_throughput_benchmark_kbs < params.bt_transfer_throughput_benchmark_kbs {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "WiFi throughput benchmark ({} KB/s) is below the BT benchmark ({} KB/s)",
                    params.wifi_transfer_throughput_benchmark_kbs,
                    params.bt_transfer_throughput_benchmark_kbs
                ),
            ));
        }

        for (label, percentile) in [
            ("BT", params.bt_transfer_throughput_kbs_percentile),
            ("WiFi", params.wifi_transfer_throughput_kbs_percentile),
        ] {
            if percentile == 0 || percentile == 100 {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!(
                        "{} throughput percentile {} compares only the {} sample",
                        label,
                        percentile,
                        if percentile == 0 { "slowest" } else { "fastest" }
                    ),
                ));
            }
        }

        warnings
    }

    fn validate_medium(params: &TestParameters) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if !is_high_quality_medium(params.upgrade_medium) {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Upgrade medium {} is not high quality; WiFi throughput is held to the BT benchmark",
                    params.upgrade_medium
                ),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    /// Get display string for level
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }

    /// Get color for terminal display
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Blue,
            Self::Warning => Color::Yellow,
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    /// Create a new validation warning
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(params: &TestParameters) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(params)
}
