//! Nearby Performance Metrics
//!
//! Metrics aggregation and statistical acceptance for Nearby Connections
//! quick-start performance runs. An external orchestrator drives the devices
//! and fills one [`SingleTestResult`] per trial; this crate accumulates those
//! samples across trials and decides whether latency, throughput and reach
//! targets were met.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{
    ConnectionRound, ConnectionSetupQualityInfo, ConnectionSetupTimeouts, MetricSeries,
    QuickStartTestMetrics, SingleTestResult, TestParameters, ThroughputBenchmark,
};
pub use stats::{
    percentile, EvaluationReport, FailTargetSummary, MetricsEvaluator, ResultStats, TargetCheck,
    TargetKind,
};
pub use types::{
    is_high_quality_medium, MediumUpgradeType, NearbyConnectionMedium, NearbyMedium, PayloadType,
};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Build metadata exported by build.rs
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const NEARBY_RESET_WAIT_TIME: Duration = Duration::from_secs(5);
    pub const WIFI_DISCONNECTION_DELAY: Duration = Duration::from_secs(3);

    pub const FIRST_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);
    pub const FIRST_CONNECTION_INIT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const FIRST_CONNECTION_RESULT_TIMEOUT: Duration = Duration::from_secs(35);
    pub const FILE_1M_PAYLOAD_TRANSFER_TIMEOUT: Duration = Duration::from_secs(110);
    pub const SECOND_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(25);
    pub const SECOND_CONNECTION_INIT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const SECOND_CONNECTION_RESULT_TIMEOUT: Duration = Duration::from_secs(25);
    pub const CONNECTION_BANDWIDTH_CHANGED_TIMEOUT: Duration = Duration::from_secs(25);
    pub const FILE_1G_PAYLOAD_TRANSFER_TIMEOUT: Duration = Duration::from_secs(210);
    pub const WIFI_WLAN_CONNECTING_TIMEOUT: Duration = Duration::from_secs(25);
    pub const DISCONNECTION_TIMEOUT: Duration = Duration::from_secs(15);

    /// 10 KB/s
    pub const BT_TRANSFER_THROUGHPUT_BENCHMARK_KBS: f64 = 10.0;
    /// 10 MB/s
    pub const WIFI_TRANSFER_THROUGHPUT_BENCHMARK_KBS: f64 = 10.0 * 1024.0;

    pub const BT_TRANSFER_THROUGHPUT_KBS_PERCENTILE: u8 = 95;
    pub const WIFI_TRANSFER_THROUGHPUT_KBS_PERCENTILE: u8 = 95;

    pub const SUCCESS_RATE_TARGET: f64 = 0.98;
    pub const REACH_RATE_TARGET: f64 = 0.95;

    /// Legacy "not measured" throughput marker accepted in trial files
    pub const UNSET_THROUGHPUT_KBS: f64 = -1.0;

    pub const DEFAULT_TEST_REPORT_ALIAS_NAME: &str = "unspecified";

    /// Process exit code when every input was valid but a target was missed
    pub const EXIT_TARGETS_MISSED: i32 = 7;
}
