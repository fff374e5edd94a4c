//! Acceptance evaluation for accumulated quick-start metrics
//!
//! Reduces the sequences of a [`QuickStartTestMetrics`] to per-series target
//! checks, an overall [`ResultStats`] verdict and one [`FailTargetSummary`]
//! for each target that was missed.

use crate::{
    defaults,
    models::{
        ConnectionRound, ConnectionSetupTimeouts, MetricSeries, QuickStartTestMetrics,
        TestParameters, ThroughputBenchmark,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Value at percentile `p` (0..=100) using linear interpolation between the
/// two nearest ranks of the sorted samples.
///
/// Returns `None` for an empty slice; the percentile of no samples is undefined.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let p = p.clamp(0.0, 100.0);
    let index = (p / 100.0) * (sorted.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        Some(sorted[lower_index])
    } else {
        let lower_value = sorted[lower_index];
        let upper_value = sorted[upper_index];
        let weight = index - lower_index as f64;
        Some(lower_value + weight * (upper_value - lower_value))
    }
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStats {
    /// Whether the aggregate reach rate met its target
    pub reach_target: bool,
    /// Fraction of expected events that actually produced a sample
    pub reach_rate: f64,
    /// Fraction of scored latency and throughput checks that passed
    pub success_rate: f64,
}

/// A target that was missed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailTargetSummary {
    pub name: String,
    pub rate: f64,
    pub goal: f64,
}

impl FailTargetSummary {
    pub fn new(name: impl Into<String>, rate: f64, goal: f64) -> Self {
        Self {
            name: name.into(),
            rate,
            goal,
        }
    }
}

impl fmt::Display for FailTargetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:.3} (goal {:.3})", self.name, self.rate, self.goal)
    }
}

/// What a [`TargetCheck`] measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Share of expected events that produced a sample
    Reach,
    /// Share of latency samples under the phase timeout
    LatencySuccess,
    /// Throughput at a percentile against a benchmark
    Throughput,
}

/// One scored target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCheck {
    pub name: String,
    pub series: MetricSeries,
    pub kind: TargetKind,
    pub sample_count: usize,
    pub expected_count: usize,
    /// Observed rate; KB/s at the percentile for throughput checks
    pub rate: f64,
    pub goal: f64,
    pub passed: bool,
    /// Median seconds for latency series, percentile KB/s for throughput series
    pub figure: Option<f64>,
}

impl TargetCheck {
    pub fn failure(&self) -> Option<FailTargetSummary> {
        (!self.passed).then(|| FailTargetSummary::new(self.name.clone(), self.rate, self.goal))
    }
}

/// Everything the evaluator concluded about one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub alias: String,
    pub trial_count: usize,
    pub stats: ResultStats,
    pub checks: Vec<TargetCheck>,
    pub failures: Vec<FailTargetSummary>,
    /// Series without samples; undefined and left out of every aggregate
    pub undefined_series: Vec<MetricSeries>,
    pub generated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// True when no target was missed and the reach target was met
    pub fn passed(&self) -> bool {
        self.failures.is_empty() && self.stats.reach_target
    }

    pub fn check(&self, name: &str) -> Option<&TargetCheck> {
        self.checks.iter().find(|check| check.name == name)
    }
}

/// Scores accumulated metrics against the benchmarks of a [`TestParameters`]
#[derive(Debug, Clone)]
pub struct MetricsEvaluator {
    params: TestParameters,
    first_round: ConnectionSetupTimeouts,
    second_round: ConnectionSetupTimeouts,
}

impl MetricsEvaluator {
    pub fn new(params: &TestParameters) -> Self {
        Self {
            params: params.clone(),
            first_round: ConnectionSetupTimeouts::default(),
            second_round: ConnectionSetupTimeouts::default(),
        }
    }

    /// Score `round` latencies against `timeouts` instead of the round defaults
    pub fn with_round_timeouts(mut self, round: ConnectionRound, timeouts: ConnectionSetupTimeouts) -> Self {
        match round {
            ConnectionRound::First => self.first_round = timeouts,
            ConnectionRound::Second => self.second_round = timeouts,
        }
        self
    }

    pub fn params(&self) -> &TestParameters {
        &self.params
    }

    /// Timeout a latency sample of `series` must stay under, if it is a latency series
    pub fn latency_timeout(&self, series: MetricSeries) -> Option<Duration> {
        let timeout = match series {
            MetricSeries::FirstDiscoveryLatencies => {
                self.first_round.resolved_discovery_timeout(ConnectionRound::First)
            }
            MetricSeries::FirstConnectionLatencies => {
                self.first_round.connection_budget(ConnectionRound::First)
            }
            MetricSeries::SecondDiscoveryLatencies => {
                self.second_round.resolved_discovery_timeout(ConnectionRound::Second)
            }
            MetricSeries::SecondConnectionLatencies => {
                self.second_round.connection_budget(ConnectionRound::Second)
            }
            MetricSeries::SecondMediumUpgradeLatencies => defaults::CONNECTION_BANDWIDTH_CHANGED_TIMEOUT,
            MetricSeries::DiscovererWifiWlanLatencies | MetricSeries::AdvertiserWifiWlanLatencies => {
                defaults::WIFI_WLAN_CONNECTING_TIMEOUT
            }
            MetricSeries::BtTransferThroughputsKbs | MetricSeries::WifiTransferThroughputsKbs => {
                return None
            }
        };
        Some(timeout)
    }

    /// Benchmark a throughput series is held to, if it is a throughput series
    pub fn throughput_benchmark(&self, series: MetricSeries) -> Option<ThroughputBenchmark> {
        match series {
            MetricSeries::BtTransferThroughputsKbs => Some(self.params.bt_benchmark()),
            MetricSeries::WifiTransferThroughputsKbs => {
                Some(self.params.throughput_benchmark(self.params.upgrade_medium))
            }
            _ => None,
        }
    }

    pub fn evaluate(&self, metrics: &QuickStartTestMetrics) -> EvaluationReport {
        let mut checks = Vec::new();
        let mut undefined_series = Vec::new();

        let mut total_samples = 0usize;
        let mut total_expected = 0usize;

        for series in MetricSeries::ALL {
            let samples = metrics.sample_count(series);
            let expected = metrics.expected_count(series);

            // An ungated series with no samples was not measured in this run
            let measured = series.is_gated() || samples > 0;
            if expected > 0 && measured {
                total_samples += samples;
                total_expected += expected;
                checks.push(self.reach_check(series, samples, expected));
            }

            if samples == 0 {
                undefined_series.push(series);
                continue;
            }

            let check = if series.is_throughput() {
                self.throughput_check(series, metrics, expected)
            } else {
                self.latency_check(series, metrics, expected)
            };
            checks.extend(check);
        }

        let stats = self.result_stats(&checks, total_samples, total_expected);
        let failures = checks.iter().filter_map(TargetCheck::failure).collect();

        EvaluationReport {
            alias: self.params.test_report_alias_name.clone(),
            trial_count: metrics.trial_count(),
            stats,
            checks,
            failures,
            undefined_series,
            generated_at: Utc::now(),
        }
    }

    fn reach_check(&self, series: MetricSeries, samples: usize, expected: usize) -> TargetCheck {
        let rate = samples as f64 / expected as f64;
        let goal = self.params.reach_rate_target;

        TargetCheck {
            name: format!("{}_reach", series.name()),
            series,
            kind: TargetKind::Reach,
            sample_count: samples,
            expected_count: expected,
            rate,
            goal,
            passed: rate >= goal,
            figure: None,
        }
    }

    fn latency_check(
        &self,
        series: MetricSeries,
        metrics: &QuickStartTestMetrics,
        expected: usize,
    ) -> Option<TargetCheck> {
        let timeout = self.latency_timeout(series)?;
        let latencies = metrics.latencies(series);
        if latencies.is_empty() {
            return None;
        }

        let under = latencies.iter().filter(|&&latency| latency < timeout).count();
        let rate = under as f64 / latencies.len() as f64;
        let goal = self.params.success_rate_target;

        Some(TargetCheck {
            name: format!("{}_success", series.name()),
            series,
            kind: TargetKind::LatencySuccess,
            sample_count: latencies.len(),
            expected_count: expected,
            rate,
            goal,
            passed: rate >= goal,
            figure: percentile(&metrics.values(series), 50.0),
        })
    }

    fn throughput_check(
        &self,
        series: MetricSeries,
        metrics: &QuickStartTestMetrics,
        expected: usize,
    ) -> Option<TargetCheck> {
        let benchmark = self.throughput_benchmark(series)?;
        let values = metrics.values(series);
        let observed = percentile(&values, f64::from(benchmark.percentile))?;

        Some(TargetCheck {
            name: format!("{}_p{}", series.name(), benchmark.percentile),
            series,
            kind: TargetKind::Throughput,
            sample_count: values.len(),
            expected_count: expected,
            rate: observed,
            goal: benchmark.kbs,
            passed: observed >= benchmark.kbs,
            figure: Some(observed),
        })
    }

    fn result_stats(&self, checks: &[TargetCheck], total_samples: usize, total_expected: usize) -> ResultStats {
        let scored: Vec<&TargetCheck> = checks
            .iter()
            .filter(|check| check.kind != TargetKind::Reach)
            .collect();

        if total_expected == 0 && scored.is_empty() {
            return ResultStats::default();
        }

        let reach_rate = if total_expected == 0 {
            0.0
        } else {
            total_samples as f64 / total_expected as f64
        };

        let success_rate = if scored.is_empty() {
            0.0
        } else {
            scored.iter().filter(|check| check.passed).count() as f64 / scored.len() as f64
        };

        ResultStats {
            reach_target: total_expected > 0 && reach_rate >= self.params.reach_rate_target,
            reach_rate,
            success_rate,
        }
    }
}


#[cfg(test)]
mod comprehensive_tests;
