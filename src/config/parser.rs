//! Parameter loading from files, environment variables and CLI arguments

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::{AppError, Result},
    models::TestParameters,
};
use std::path::Path;

/// Builds [`TestParameters`] from every configuration source.
///
/// Sources are applied in order: defaults, the `--params` JSON file, the
/// `.env` file, `NC_*` environment variables, then CLI overrides. The result
/// is validated before it is returned.
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete parameters
    pub fn parse(&self) -> Result<TestParameters> {
        let mut params = match self.cli.params {
            Some(ref path) => load_params_file(path)?,
            None => TestParameters::default(),
        };

        EnvManager::load_env_file()?;
        params.merge_from_env()?;

        self.apply_cli_overrides(&mut params);

        params.validate()?;

        Ok(params)
    }

    /// Apply CLI argument overrides to parameters
    fn apply_cli_overrides(&self, params: &mut TestParameters) {
        if let Some(ref alias) = self.cli.alias {
            params.test_report_alias_name = alias.trim().to_string();
        }

        if let Some(medium) = self.cli.medium {
            params.upgrade_medium = medium;
        }

        if let Some(kbs) = self.cli.bt_benchmark {
            params.bt_transfer_throughput_benchmark_kbs = kbs;
        }

        if let Some(kbs) = self.cli.wifi_benchmark {
            params.wifi_transfer_throughput_benchmark_kbs = kbs;
        }

        if let Some(percentile) = self.cli.bt_percentile {
            params.bt_transfer_throughput_kbs_percentile = percentile;
        }

        if let Some(percentile) = self.cli.wifi_percentile {
            params.wifi_transfer_throughput_kbs_percentile = percentile;
        }

        if let Some(target) = self.cli.success_target {
            params.success_rate_target = target;
        }

        if let Some(target) = self.cli.reach_target {
            params.reach_rate_target = target;
        }
    }
}

/// Read parameters from a JSON file; missing fields take their defaults
pub fn load_params_file(path: &Path) -> Result<TestParameters> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("Failed to read parameters file {}: {}", path.display(), e))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        AppError::config(format!("Invalid parameters file {}: {}", path.display(), e))
    })
}

/// Convenience function to load complete parameters from CLI arguments
pub fn load_config(cli: Cli) -> Result<TestParameters> {
    ConfigParser::new(cli).parse()
}

/// Display parameter summary for debug purposes
pub fn display_config_summary(params: &TestParameters) -> String {
    let bt = params.bt_benchmark();
    let wifi = params.throughput_benchmark(params.upgrade_medium);

    let mut summary = Vec::new();

    summary.push(format!("Report alias: {}", params.test_report_alias_name));
    summary.push(format!(
        "Upgrade medium: {} ({})",
        params.upgrade_medium, params.medium_upgrade_type
    ));
    summary.push(format!("Payload type: {}", params.payload_type));
    summary.push(format!("BT benchmark: p{} >= {} KB/s", bt.percentile, bt.kbs));
    summary.push(format!("WiFi benchmark: p{} >= {} KB/s", wifi.percentile, wifi.kbs));
    summary.push(format!("Success rate target: {}", params.success_rate_target));
    summary.push(format!("Reach rate target: {}", params.reach_rate_target));

    if params.wifi_configured() {
        let password = if params.wifi_password.is_empty() { "(none)" } else { "********" };
        summary.push(format!(
            "WiFi: {} [{}] password {}",
            params.wifi_ssid, params.wifi_country_code, password
        ));
    } else {
        summary.push("WiFi: not configured".to_string());
    }

    summary.push(format!("Fast fail: {}", params.fast_fail_on_any_error));

    summary.join("\n")
}
