//! Result record for one trial

use super::quality::ConnectionSetupQualityInfo;
use super::serde_units::{opt_kbs, opt_secs};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Everything measured during one discover/connect/upgrade/transfer trial.
///
/// The orchestrator creates a fresh value per trial, fills fields as events
/// complete, then hands it to [`QuickStartTestMetrics::record`](super::QuickStartTestMetrics::record).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleTestResult {
    #[serde(default)]
    pub first_connection_setup_quality_info: ConnectionSetupQualityInfo,

    /// BT transfer throughput over the first connection (KB/s)
    #[serde(default, with = "opt_kbs")]
    pub first_bt_transfer_throughput_kbs: Option<f64>,

    /// WLAN join latency measured on the discoverer
    #[serde(default, with = "opt_secs")]
    pub discoverer_wifi_wlan_latency: Option<Duration>,

    #[serde(default)]
    pub second_connection_setup_quality_info: ConnectionSetupQualityInfo,

    /// WiFi transfer throughput over the second connection (KB/s)
    #[serde(default, with = "opt_kbs")]
    pub second_wifi_transfer_throughput_kbs: Option<f64>,

    /// WLAN join latency measured on the advertiser
    #[serde(default, with = "opt_secs")]
    pub advertiser_wifi_wlan_latency: Option<Duration>,

    #[serde(default)]
    pub discoverer_wifi_wlan_expected: bool,

    #[serde(default)]
    pub advertiser_wifi_wlan_expected: bool,
}

impl SingleTestResult {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for SingleTestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1st connection: {}", self.first_connection_setup_quality_info)?;
        if let Some(kbs) = self.first_bt_transfer_throughput_kbs {
            write!(f, ", bt: {:.1}KB/s", kbs)?;
        }
        write!(f, "; 2nd connection: {}", self.second_connection_setup_quality_info)?;
        if let Some(kbs) = self.second_wifi_transfer_throughput_kbs {
            write!(f, ", wifi: {:.1}KB/s", kbs)?;
        }
        Ok(())
    }
}
