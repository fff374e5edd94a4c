//! Accumulated samples for a whole quick-start test run

use super::trial::SingleTestResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The nine sample sequences kept by [`QuickStartTestMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSeries {
    FirstDiscoveryLatencies,
    FirstConnectionLatencies,
    DiscovererWifiWlanLatencies,
    BtTransferThroughputsKbs,
    SecondDiscoveryLatencies,
    SecondConnectionLatencies,
    SecondMediumUpgradeLatencies,
    AdvertiserWifiWlanLatencies,
    WifiTransferThroughputsKbs,
}

impl MetricSeries {
    /// Every series, in report order
    pub const ALL: [MetricSeries; 9] = [
        Self::FirstDiscoveryLatencies,
        Self::FirstConnectionLatencies,
        Self::DiscovererWifiWlanLatencies,
        Self::BtTransferThroughputsKbs,
        Self::SecondDiscoveryLatencies,
        Self::SecondConnectionLatencies,
        Self::SecondMediumUpgradeLatencies,
        Self::AdvertiserWifiWlanLatencies,
        Self::WifiTransferThroughputsKbs,
    ];

    /// Stable snake_case name used in reports and failure summaries
    pub fn name(self) -> &'static str {
        match self {
            Self::FirstDiscoveryLatencies => "first_discovery_latencies",
            Self::FirstConnectionLatencies => "first_connection_latencies",
            Self::DiscovererWifiWlanLatencies => "discoverer_wifi_wlan_latencies",
            Self::BtTransferThroughputsKbs => "bt_transfer_throughputs_kbs",
            Self::SecondDiscoveryLatencies => "second_discovery_latencies",
            Self::SecondConnectionLatencies => "second_connection_latencies",
            Self::SecondMediumUpgradeLatencies => "second_medium_upgrade_latencies",
            Self::AdvertiserWifiWlanLatencies => "advertiser_wifi_wlan_latencies",
            Self::WifiTransferThroughputsKbs => "wifi_transfer_throughputs_kbs",
        }
    }

    pub fn is_throughput(self) -> bool {
        matches!(
            self,
            Self::BtTransferThroughputsKbs | Self::WifiTransferThroughputsKbs
        )
    }

    /// Series whose expected count comes from a per-trial expectation flag
    pub fn is_gated(self) -> bool {
        matches!(
            self,
            Self::DiscovererWifiWlanLatencies
                | Self::SecondMediumUpgradeLatencies
                | Self::AdvertiserWifiWlanLatencies
        )
    }
}

impl fmt::Display for MetricSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Struct-of-sequences accumulator, one per test run.
///
/// Each recorded trial appends at most one value per sequence, in trial
/// order. A measurement the trial did not produce is left out rather than
/// zero-filled, so every sequence holds only real samples and its length
/// never exceeds the number of trials that expected it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuickStartTestMetrics {
    #[serde(serialize_with = "serialize_secs")]
    first_discovery_latencies: Vec<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    first_connection_latencies: Vec<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    discoverer_wifi_wlan_latencies: Vec<Duration>,
    bt_transfer_throughputs_kbs: Vec<f64>,
    #[serde(serialize_with = "serialize_secs")]
    second_discovery_latencies: Vec<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    second_connection_latencies: Vec<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    second_medium_upgrade_latencies: Vec<Duration>,
    #[serde(serialize_with = "serialize_secs")]
    advertiser_wifi_wlan_latencies: Vec<Duration>,
    wifi_transfer_throughputs_kbs: Vec<f64>,

    trial_count: usize,
    discoverer_wifi_wlan_expected_count: usize,
    medium_upgrade_expected_count: usize,
    advertiser_wifi_wlan_expected_count: usize,
}

fn serialize_secs<S>(values: &[Duration], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(values.iter().map(Duration::as_secs_f64))
}

impl QuickStartTestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an accumulator from trials already collected
    pub fn from_trials<'a, I>(trials: I) -> Self
    where
        I: IntoIterator<Item = &'a SingleTestResult>,
    {
        let mut metrics = Self::new();
        metrics.extend(trials);
        metrics
    }

    /// Fold one finished trial into the sequences
    pub fn record(&mut self, trial: &SingleTestResult) {
        let first = &trial.first_connection_setup_quality_info;
        let second = &trial.second_connection_setup_quality_info;

        self.trial_count += 1;

        push_some(&mut self.first_discovery_latencies, first.discovery_latency);
        push_some(&mut self.first_connection_latencies, first.connection_latency);
        push_some(&mut self.bt_transfer_throughputs_kbs, trial.first_bt_transfer_throughput_kbs);

        if trial.discoverer_wifi_wlan_expected {
            self.discoverer_wifi_wlan_expected_count += 1;
            push_some(&mut self.discoverer_wifi_wlan_latencies, trial.discoverer_wifi_wlan_latency);
        }

        push_some(&mut self.second_discovery_latencies, second.discovery_latency);
        push_some(&mut self.second_connection_latencies, second.connection_latency);

        if second.medium_upgrade_expected {
            self.medium_upgrade_expected_count += 1;
            push_some(&mut self.second_medium_upgrade_latencies, second.medium_upgrade_latency);
        }

        if trial.advertiser_wifi_wlan_expected {
            self.advertiser_wifi_wlan_expected_count += 1;
            push_some(&mut self.advertiser_wifi_wlan_latencies, trial.advertiser_wifi_wlan_latency);
        }

        push_some(&mut self.wifi_transfer_throughputs_kbs, trial.second_wifi_transfer_throughput_kbs);
    }

    pub fn trial_count(&self) -> usize {
        self.trial_count
    }

    pub fn is_empty(&self) -> bool {
        self.trial_count == 0
    }

    /// Number of trials in which `series` was expected to produce a sample
    pub fn expected_count(&self, series: MetricSeries) -> usize {
        match series {
            MetricSeries::DiscovererWifiWlanLatencies => self.discoverer_wifi_wlan_expected_count,
            MetricSeries::SecondMediumUpgradeLatencies => self.medium_upgrade_expected_count,
            MetricSeries::AdvertiserWifiWlanLatencies => self.advertiser_wifi_wlan_expected_count,
            _ => self.trial_count,
        }
    }

    pub fn sample_count(&self, series: MetricSeries) -> usize {
        match series {
            MetricSeries::BtTransferThroughputsKbs => self.bt_transfer_throughputs_kbs.len(),
            MetricSeries::WifiTransferThroughputsKbs => self.wifi_transfer_throughputs_kbs.len(),
            latency => self.latencies(latency).len(),
        }
    }

    /// Samples of `series` as plain numbers: seconds for latencies, KB/s for throughputs
    pub fn values(&self, series: MetricSeries) -> Vec<f64> {
        match series {
            MetricSeries::BtTransferThroughputsKbs => self.bt_transfer_throughputs_kbs.clone(),
            MetricSeries::WifiTransferThroughputsKbs => self.wifi_transfer_throughputs_kbs.clone(),
            latency => self
                .latencies(latency)
                .iter()
                .map(Duration::as_secs_f64)
                .collect(),
        }
    }

    /// Latency samples of `series`; empty for the throughput series
    pub fn latencies(&self, series: MetricSeries) -> &[Duration] {
        match series {
            MetricSeries::FirstDiscoveryLatencies => &self.first_discovery_latencies,
            MetricSeries::FirstConnectionLatencies => &self.first_connection_latencies,
            MetricSeries::DiscovererWifiWlanLatencies => &self.discoverer_wifi_wlan_latencies,
            MetricSeries::SecondDiscoveryLatencies => &self.second_discovery_latencies,
            MetricSeries::SecondConnectionLatencies => &self.second_connection_latencies,
            MetricSeries::SecondMediumUpgradeLatencies => &self.second_medium_upgrade_latencies,
            MetricSeries::AdvertiserWifiWlanLatencies => &self.advertiser_wifi_wlan_latencies,
            MetricSeries::BtTransferThroughputsKbs | MetricSeries::WifiTransferThroughputsKbs => &[],
        }
    }

    pub fn first_discovery_latencies(&self) -> &[Duration] {
        &self.first_discovery_latencies
    }

    pub fn first_connection_latencies(&self) -> &[Duration] {
        &self.first_connection_latencies
    }

    pub fn discoverer_wifi_wlan_latencies(&self) -> &[Duration] {
        &self.discoverer_wifi_wlan_latencies
    }

    pub fn bt_transfer_throughputs_kbs(&self) -> &[f64] {
        &self.bt_transfer_throughputs_kbs
    }

    pub fn second_discovery_latencies(&self) -> &[Duration] {
        &self.second_discovery_latencies
    }

    pub fn second_connection_latencies(&self) -> &[Duration] {
        &self.second_connection_latencies
    }

    pub fn second_medium_upgrade_latencies(&self) -> &[Duration] {
        &self.second_medium_upgrade_latencies
    }

    pub fn advertiser_wifi_wlan_latencies(&self) -> &[Duration] {
        &self.advertiser_wifi_wlan_latencies
    }

    pub fn wifi_transfer_throughputs_kbs(&self) -> &[f64] {
        &self.wifi_transfer_throughputs_kbs
    }

    /// Drop every sample and count, ready for a new run
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn push_some<T>(series: &mut Vec<T>, value: Option<T>) {
    if let Some(value) = value {
        series.push(value);
    }
}

impl<'a> Extend<&'a SingleTestResult> for QuickStartTestMetrics {
    fn extend<I: IntoIterator<Item = &'a SingleTestResult>>(&mut self, trials: I) {
        for trial in trials {
            self.record(trial);
        }
    }
}
