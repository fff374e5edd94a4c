//! Data models for trial results, run parameters and accumulated metrics

pub mod config;
pub mod metrics;
pub mod quality;
mod serde_units;
pub mod timeouts;
pub mod trial;

// Re-export main model types
pub use config::{TestParameters, ThroughputBenchmark};
pub use metrics::{MetricSeries, QuickStartTestMetrics};
pub use quality::ConnectionSetupQualityInfo;
pub use timeouts::{ConnectionRound, ConnectionSetupTimeouts};
pub use trial::SingleTestResult;
