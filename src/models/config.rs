//! Test run parameters and validation

use crate::config::EnvManager;
use crate::types::{
    is_high_quality_medium, AppError, MediumUpgradeType, NearbyMedium, PayloadType, Result,
};
use serde::{Deserialize, Serialize};

/// Tunables for one quick-start performance run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParameters {
    /// Name used to tag the run in reports
    #[serde(default = "default_alias_name")]
    pub test_report_alias_name: String,

    /// Abort the run on the first failed trial
    #[serde(default)]
    pub fast_fail_on_any_error: bool,

    /// WiFi country code; empty means "do not configure WiFi"
    #[serde(default)]
    pub wifi_country_code: String,

    /// WiFi SSID; empty means "do not configure WiFi"
    #[serde(default)]
    pub wifi_ssid: String,

    #[serde(default)]
    pub wifi_password: String,

    /// Toggle airplane mode on the target side before each trial
    #[serde(default = "default_true")]
    pub toggle_airplane_mode_target_side: bool,

    /// Disconnect WiFi once the run completes
    #[serde(default)]
    pub disconnect_wifi_after_test: bool,

    /// Minimum acceptable BT throughput (KB/s)
    #[serde(default = "default_bt_benchmark")]
    pub bt_transfer_throughput_benchmark_kbs: f64,

    /// Percentile of BT throughput compared against the benchmark
    #[serde(default = "default_bt_percentile")]
    pub bt_transfer_throughput_kbs_percentile: u8,

    /// Minimum acceptable WiFi throughput (KB/s)
    #[serde(default = "default_wifi_benchmark")]
    pub wifi_transfer_throughput_benchmark_kbs: f64,

    /// Percentile of WiFi throughput compared against the benchmark
    #[serde(default = "default_wifi_percentile")]
    pub wifi_transfer_throughput_kbs_percentile: u8,

    /// Payload used for throughput measurement
    #[serde(default)]
    pub payload_type: PayloadType,

    /// Medium requested for the upgraded (second) connection
    #[serde(default = "default_upgrade_medium")]
    pub upgrade_medium: NearbyMedium,

    #[serde(default)]
    pub medium_upgrade_type: MediumUpgradeType,

    /// Required fraction of latency samples under their phase timeout
    #[serde(default = "default_success_rate_target")]
    pub success_rate_target: f64,

    /// Required fraction of expected events that were actually observed
    #[serde(default = "default_reach_rate_target")]
    pub reach_rate_target: f64,
}

/// Benchmark and percentile pair applied to one throughput series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThroughputBenchmark {
    pub kbs: f64,
    pub percentile: u8,
}

impl Default for TestParameters {
    fn default() -> Self {
        Self {
            test_report_alias_name: default_alias_name(),
            fast_fail_on_any_error: false,
            wifi_country_code: String::new(),
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            toggle_airplane_mode_target_side: true,
            disconnect_wifi_after_test: false,
            bt_transfer_throughput_benchmark_kbs: default_bt_benchmark(),
            bt_transfer_throughput_kbs_percentile: default_bt_percentile(),
            wifi_transfer_throughput_benchmark_kbs: default_wifi_benchmark(),
            wifi_transfer_throughput_kbs_percentile: default_wifi_percentile(),
            payload_type: PayloadType::default(),
            upgrade_medium: default_upgrade_medium(),
            medium_upgrade_type: MediumUpgradeType::default(),
            success_rate_target: default_success_rate_target(),
            reach_rate_target: default_reach_rate_target(),
        }
    }
}

impl TestParameters {
    /// Create parameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether WiFi credentials were supplied
    pub fn wifi_configured(&self) -> bool {
        !self.wifi_ssid.is_empty()
    }

    /// BT benchmark/percentile pair
    pub fn bt_benchmark(&self) -> ThroughputBenchmark {
        ThroughputBenchmark {
            kbs: self.bt_transfer_throughput_benchmark_kbs,
            percentile: self.bt_transfer_throughput_kbs_percentile,
        }
    }

    /// WiFi benchmark/percentile pair
    pub fn wifi_benchmark(&self) -> ThroughputBenchmark {
        ThroughputBenchmark {
            kbs: self.wifi_transfer_throughput_benchmark_kbs,
            percentile: self.wifi_transfer_throughput_kbs_percentile,
        }
    }

    /// Benchmark that applies to a transfer over `medium`
    pub fn throughput_benchmark(&self, medium: NearbyMedium) -> ThroughputBenchmark {
        if is_high_quality_medium(medium) {
            self.wifi_benchmark()
        } else {
            self.bt_benchmark()
        }
    }

    /// Validate the parameters and return the first violation
    pub fn validate(&self) -> Result<()> {
        if self.test_report_alias_name.trim().is_empty() {
            return Err(AppError::config("Test report alias name cannot be empty"));
        }

        validate_percentile("BT throughput percentile", self.bt_transfer_throughput_kbs_percentile)?;
        validate_percentile("WiFi throughput percentile", self.wifi_transfer_throughput_kbs_percentile)?;

        validate_benchmark("BT throughput benchmark", self.bt_transfer_throughput_benchmark_kbs)?;
        validate_benchmark("WiFi throughput benchmark", self.wifi_transfer_throughput_benchmark_kbs)?;

        validate_rate("Success rate target", self.success_rate_target)?;
        validate_rate("Reach rate target", self.reach_rate_target)?;

        Ok(())
    }

    /// Merge `NC_*` environment variables into these parameters
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Some(alias) = env_value("NC_TEST_REPORT_ALIAS_NAME")? {
            self.test_report_alias_name = alias.trim().to_string();
        }

        if let Some(value) = env_parsed::<bool>("NC_FAST_FAIL_ON_ANY_ERROR")? {
            self.fast_fail_on_any_error = value;
        }

        if let Some(country_code) = env_value("NC_WIFI_COUNTRY_CODE")? {
            self.wifi_country_code = country_code.trim().to_string();
        }

        if let Some(ssid) = env_value("NC_WIFI_SSID")? {
            self.wifi_ssid = ssid;
        }

        if let Some(password) = env_value("NC_WIFI_PASSWORD")? {
            self.wifi_password = password;
        }

        if let Some(value) = env_parsed::<bool>("NC_TOGGLE_AIRPLANE_MODE_TARGET_SIDE")? {
            self.toggle_airplane_mode_target_side = value;
        }

        if let Some(value) = env_parsed::<bool>("NC_DISCONNECT_WIFI_AFTER_TEST")? {
            self.disconnect_wifi_after_test = value;
        }

        if let Some(value) = env_parsed::<f64>("NC_BT_THROUGHPUT_BENCHMARK_KBS")? {
            self.bt_transfer_throughput_benchmark_kbs = value;
        }

        if let Some(value) = env_parsed::<u8>("NC_BT_THROUGHPUT_PERCENTILE")? {
            self.bt_transfer_throughput_kbs_percentile = value;
        }

        if let Some(value) = env_parsed::<f64>("NC_WIFI_THROUGHPUT_BENCHMARK_KBS")? {
            self.wifi_transfer_throughput_benchmark_kbs = value;
        }

        if let Some(value) = env_parsed::<u8>("NC_WIFI_THROUGHPUT_PERCENTILE")? {
            self.wifi_transfer_throughput_kbs_percentile = value;
        }

        if let Some(value) = env_parsed::<PayloadType>("NC_PAYLOAD_TYPE")? {
            self.payload_type = value;
        }

        if let Some(value) = env_parsed::<NearbyMedium>("NC_UPGRADE_MEDIUM")? {
            self.upgrade_medium = value;
        }

        if let Some(value) = env_parsed::<MediumUpgradeType>("NC_MEDIUM_UPGRADE_TYPE")? {
            self.medium_upgrade_type = value;
        }

        if let Some(value) = env_parsed::<f64>("NC_SUCCESS_RATE_TARGET")? {
            self.success_rate_target = value;
        }

        if let Some(value) = env_parsed::<f64>("NC_REACH_RATE_TARGET")? {
            self.reach_rate_target = value;
        }

        Ok(())
    }
}

/// Read `key`, rejecting values that fail its format check
fn env_value(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(raw) => {
            EnvManager::validate_env_var(key, &raw)?;
            Ok(Some(raw))
        }
        Err(_) => Ok(None),
    }
}

fn env_parsed<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_value(key)?
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, raw, e)))
        })
        .transpose()
}

fn validate_percentile(label: &str, percentile: u8) -> Result<()> {
    if percentile > 100 {
        return Err(AppError::config(format!(
            "{} must be between 0 and 100, got: {}",
            label, percentile
        )));
    }
    Ok(())
}

fn validate_benchmark(label: &str, kbs: f64) -> Result<()> {
    if !kbs.is_finite() || kbs < 0.0 {
        return Err(AppError::config(format!(
            "{} must be a non-negative number of KB/s, got: {}",
            label, kbs
        )));
    }
    Ok(())
}

fn validate_rate(label: &str, rate: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(AppError::config(format!(
            "{} must be between 0.0 and 1.0, got: {}",
            label, rate
        )));
    }
    Ok(())
}

// Default value functions for serde
fn default_alias_name() -> String {
    crate::defaults::DEFAULT_TEST_REPORT_ALIAS_NAME.to_string()
}

fn default_true() -> bool {
    true
}

fn default_bt_benchmark() -> f64 {
    crate::defaults::BT_TRANSFER_THROUGHPUT_BENCHMARK_KBS
}

fn default_bt_percentile() -> u8 {
    crate::defaults::BT_TRANSFER_THROUGHPUT_KBS_PERCENTILE
}

fn default_wifi_benchmark() -> f64 {
    crate::defaults::WIFI_TRANSFER_THROUGHPUT_BENCHMARK_KBS
}

fn default_wifi_percentile() -> u8 {
    crate::defaults::WIFI_TRANSFER_THROUGHPUT_KBS_PERCENTILE
}

fn default_upgrade_medium() -> NearbyMedium {
    NearbyMedium::UpgradeToAllWifi
}

fn default_success_rate_target() -> f64 {
    crate::defaults::SUCCESS_RATE_TARGET
}

fn default_reach_rate_target() -> f64 {
    crate::defaults::REACH_RATE_TARGET
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = TestParameters::default();

        assert_eq!(params.test_report_alias_name, "unspecified");
        assert!(!params.fast_fail_on_any_error);
        assert!(params.wifi_ssid.is_empty());
        assert!(params.wifi_password.is_empty());
        assert!(params.wifi_country_code.is_empty());
        assert!(params.toggle_airplane_mode_target_side);
        assert!(!params.disconnect_wifi_after_test);
        assert_eq!(params.bt_transfer_throughput_benchmark_kbs, 10.0);
        assert_eq!(params.bt_transfer_throughput_kbs_percentile, 95);
        assert_eq!(params.wifi_transfer_throughput_benchmark_kbs, 10240.0);
        assert_eq!(params.wifi_transfer_throughput_kbs_percentile, 95);
        assert_eq!(params.payload_type, PayloadType::Stream);
        assert!(!params.wifi_configured());
    }

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(TestParameters::default().validate().is_ok());
    }

    #[test]
    fn test_percentile_out_of_range_invalid() {
        let mut params = TestParameters::default();
        params.wifi_transfer_throughput_kbs_percentile = 101;
        let error = params.validate().unwrap_err();
        assert!(matches!(error, AppError::Config(_)));

        params.wifi_transfer_throughput_kbs_percentile = 100;
        params.bt_transfer_throughput_kbs_percentile = 0;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_negative_or_nan_benchmark_invalid() {
        let mut params = TestParameters::default();
        params.bt_transfer_throughput_benchmark_kbs = -0.5;
        assert!(params.validate().is_err());

        params.bt_transfer_throughput_benchmark_kbs = f64::NAN;
        assert!(params.validate().is_err());

        params.bt_transfer_throughput_benchmark_kbs = 0.0;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_rate_targets_must_be_fractions() {
        let mut params = TestParameters::default();
        params.success_rate_target = 98.0;
        assert!(params.validate().is_err());

        params.success_rate_target = 0.98;
        params.reach_rate_target = -0.1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_empty_alias_invalid() {
        let mut params = TestParameters::default();
        params.test_report_alias_name = "  ".to_string();
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_throughput_benchmark_follows_medium_quality() {
        let mut params = TestParameters::default();
        params.bt_transfer_throughput_benchmark_kbs = 20.0;
        params.bt_transfer_throughput_kbs_percentile = 50;

        let wifi = params.throughput_benchmark(NearbyMedium::UpgradeToWifiDirect);
        assert_eq!(wifi, ThroughputBenchmark { kbs: 10240.0, percentile: 95 });

        let bt = params.throughput_benchmark(NearbyMedium::BleOnly);
        assert_eq!(bt, ThroughputBenchmark { kbs: 20.0, percentile: 50 });
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let params: TestParameters = serde_json::from_str(
            r#"{"test_report_alias_name": "pixel-pair", "upgrade_medium": 3, "payload_type": 2}"#,
        )
        .unwrap();

        assert_eq!(params.test_report_alias_name, "pixel-pair");
        assert_eq!(params.upgrade_medium, NearbyMedium::WifiLanOnly);
        assert_eq!(params.payload_type, PayloadType::File);
        assert!(params.toggle_airplane_mode_target_side);
        assert_eq!(params.reach_rate_target, 0.95);
    }

    /// Sets `NC_*` variables for one test and restores their previous values on drop.
    /// Holds a lock so tests in this binary never see each other's variables.
    struct EnvGuard {
        saved: Vec<(&'static str, Option<String>)>,
        _lock: std::sync::MutexGuard<'static, ()>,
    }

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let saved = vars
                .iter()
                .map(|(key, value)| {
                    let previous = std::env::var(key).ok();
                    std::env::set_var(key, value);
                    (*key, previous)
                })
                .collect();
            Self { saved, _lock: lock }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, previous) in &self.saved {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_merge_from_env() {
        let _env = EnvGuard::set(&[
            ("NC_TEST_REPORT_ALIAS_NAME", "lab-7"),
            ("NC_BT_THROUGHPUT_PERCENTILE", "90"),
            ("NC_UPGRADE_MEDIUM", "UPGRADE_TO_WIFIHOTSPOT"),
            ("NC_DISCONNECT_WIFI_AFTER_TEST", "true"),
            ("NC_WIFI_COUNTRY_CODE", " de "),
        ]);

        let mut params = TestParameters::default();
        params.merge_from_env().unwrap();

        assert_eq!(params.test_report_alias_name, "lab-7");
        assert_eq!(params.bt_transfer_throughput_kbs_percentile, 90);
        assert_eq!(params.upgrade_medium, NearbyMedium::UpgradeToWifiHotspot);
        assert!(params.disconnect_wifi_after_test);
        assert_eq!(params.wifi_country_code, "de");
    }

    #[test]
    fn test_merge_from_env_rejects_unparsable_value() {
        let _env = EnvGuard::set(&[("NC_WIFI_THROUGHPUT_PERCENTILE", "ninety")]);

        let result = TestParameters::default().merge_from_env();
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_merge_from_env_rejects_malformed_country_code() {
        let _env = EnvGuard::set(&[("NC_WIFI_COUNTRY_CODE", "USA")]);

        let result = TestParameters::default().merge_from_env();
        match result {
            Err(AppError::Config(message)) => assert!(message.contains("two-letter")),
            other => panic!("expected a config error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_from_env_rejects_empty_alias() {
        let _env = EnvGuard::set(&[("NC_TEST_REPORT_ALIAS_NAME", "   ")]);

        assert!(TestParameters::default().merge_from_env().is_err());
    }

    #[test]
    fn test_env_guard_restores_previous_values() {
        let before = std::env::var("NC_SUCCESS_RATE_TARGET").ok();
        {
            let _env = EnvGuard::set(&[("NC_SUCCESS_RATE_TARGET", "0.5")]);
            assert_eq!(std::env::var("NC_SUCCESS_RATE_TARGET").as_deref(), Ok("0.5"));
        }
        assert_eq!(std::env::var("NC_SUCCESS_RATE_TARGET").ok(), before);
    }
}
