//! Quality record for a single connection setup

use super::serde_units::opt_secs;
use crate::types::NearbyConnectionMedium;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Latencies observed while setting up one connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSetupQualityInfo {
    /// Time until the peer was discovered
    #[serde(default, with = "opt_secs")]
    pub discovery_latency: Option<Duration>,

    /// Time from connection request to connection result
    #[serde(default, with = "opt_secs")]
    pub connection_latency: Option<Duration>,

    /// Time until the bandwidth upgrade completed
    #[serde(default, with = "opt_secs")]
    pub medium_upgrade_latency: Option<Duration>,

    /// Whether this trial was supposed to upgrade the medium
    #[serde(default)]
    pub medium_upgrade_expected: bool,

    /// Medium the connection ended up on after the upgrade
    #[serde(default)]
    pub upgrade_medium: Option<NearbyConnectionMedium>,
}

impl ConnectionSetupQualityInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an upgrade was expected and its latency was recorded
    pub fn upgrade_reached(&self) -> bool {
        self.medium_upgrade_expected && self.medium_upgrade_latency.is_some()
    }
}

/// One-decimal seconds, or `n/a` when the latency was never measured
fn format_secs(latency: Option<Duration>) -> String {
    match latency {
        Some(duration) => format!("{:.1}s", duration.as_secs_f64()),
        None => "n/a".to_string(),
    }
}

impl fmt::Display for ConnectionSetupQualityInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discovery: {}, connection: {}",
            format_secs(self.discovery_latency),
            format_secs(self.connection_latency)
        )?;

        if let Some(upgrade) = self.medium_upgrade_latency {
            write!(f, ", upgrade:{:.1}s", upgrade.as_secs_f64())?;
        }

        // UNKNOWN carries code 0 and reads as "no medium" downstream.
        match self.upgrade_medium {
            Some(medium) if medium != NearbyConnectionMedium::Unknown => {
                write!(f, ", medium: {}", medium.name())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(discovery_ms: u64, connection_ms: u64) -> ConnectionSetupQualityInfo {
        ConnectionSetupQualityInfo {
            discovery_latency: Some(Duration::from_millis(discovery_ms)),
            connection_latency: Some(Duration::from_millis(connection_ms)),
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_without_upgrade() {
        assert_eq!(info(2340, 5000).to_string(), "discovery: 2.3s, connection: 5.0s");
    }

    #[test]
    fn test_summary_with_upgrade_and_medium() {
        let mut quality = info(2340, 5000);
        quality.medium_upgrade_latency = Some(Duration::from_millis(1250));
        quality.upgrade_medium = Some(NearbyConnectionMedium::WifiLan);

        assert_eq!(
            quality.to_string(),
            "discovery: 2.3s, connection: 5.0s, upgrade:1.2s, medium: WIFI_LAN"
        );
    }

    #[test]
    fn test_zero_upgrade_latency_still_prints() {
        let mut quality = info(1000, 1000);
        quality.medium_upgrade_latency = Some(Duration::ZERO);

        assert_eq!(quality.to_string(), "discovery: 1.0s, connection: 1.0s, upgrade:0.0s");
    }

    #[test]
    fn test_medium_without_upgrade_latency() {
        let mut quality = info(1000, 1500);
        quality.upgrade_medium = Some(NearbyConnectionMedium::WifiDirect);

        assert_eq!(quality.to_string(), "discovery: 1.0s, connection: 1.5s, medium: WIFI_DIRECT");
    }

    #[test]
    fn test_unknown_medium_is_not_printed() {
        let mut quality = info(1000, 1500);
        quality.upgrade_medium = Some(NearbyConnectionMedium::Unknown);

        assert_eq!(quality.to_string(), "discovery: 1.0s, connection: 1.5s");
    }

    #[test]
    fn test_unset_latencies_print_placeholder() {
        let quality = ConnectionSetupQualityInfo::new();
        assert_eq!(quality.to_string(), "discovery: n/a, connection: n/a");
    }

    #[test]
    fn test_upgrade_reached() {
        let mut quality = info(1000, 1000);
        assert!(!quality.upgrade_reached());

        quality.medium_upgrade_expected = true;
        assert!(!quality.upgrade_reached());

        quality.medium_upgrade_latency = Some(Duration::from_secs(3));
        assert!(quality.upgrade_reached());
    }

    #[test]
    fn test_json_uses_seconds_and_codes() {
        let quality: ConnectionSetupQualityInfo = serde_json::from_str(
            r#"{"discovery_latency": 1.5, "connection_latency": null,
                "medium_upgrade_expected": true, "upgrade_medium": 8}"#,
        )
        .unwrap();

        assert_eq!(quality.discovery_latency, Some(Duration::from_millis(1500)));
        assert_eq!(quality.connection_latency, None);
        assert_eq!(quality.medium_upgrade_latency, None);
        assert_eq!(quality.upgrade_medium, Some(NearbyConnectionMedium::WifiDirect));
    }

    #[test]
    fn test_legacy_max_latency_decodes_as_unset() {
        let quality: ConnectionSetupQualityInfo =
            serde_json::from_str(r#"{"discovery_latency": 86399999999999.999}"#).unwrap();
        assert_eq!(quality.discovery_latency, None);
    }
}
