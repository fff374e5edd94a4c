//! Property-based tests for percentile math and run evaluation

use super::{percentile, MetricsEvaluator, TargetKind};
use crate::models::{MetricSeries, QuickStartTestMetrics, SingleTestResult, TestParameters};
use proptest::collection::vec;
use proptest::prelude::*;
use std::time::Duration;

/// Property-based test generators
mod generators {
    use super::*;

    pub fn positive_floats() -> impl Strategy<Value = f64> {
        0.001f64..1_000_000.0
    }

    pub fn number_vectors() -> impl Strategy<Value = Vec<f64>> {
        vec(positive_floats(), 1..500)
    }

    fn latency() -> impl Strategy<Value = Option<Duration>> {
        prop::option::of((0u64..90_000).prop_map(Duration::from_millis))
    }

    fn throughput() -> impl Strategy<Value = Option<f64>> {
        prop::option::of(0.0f64..50_000.0)
    }

    /// Trials with any mix of measured, missing and gated values
    pub fn trial() -> impl Strategy<Value = SingleTestResult> {
        (
            (latency(), latency(), throughput(), latency(), any::<bool>()),
            (latency(), latency(), latency(), any::<bool>(), throughput()),
            (latency(), any::<bool>()),
        )
            .prop_map(
                |(
                    (first_discovery, first_connection, bt, discoverer_wlan, discoverer_expected),
                    (second_discovery, second_connection, upgrade, upgrade_expected, wifi),
                    (advertiser_wlan, advertiser_expected),
                )| {
                    let mut trial = SingleTestResult::new();
                    let first = &mut trial.first_connection_setup_quality_info;
                    first.discovery_latency = first_discovery;
                    first.connection_latency = first_connection;

                    let second = &mut trial.second_connection_setup_quality_info;
                    second.discovery_latency = second_discovery;
                    second.connection_latency = second_connection;
                    second.medium_upgrade_latency = upgrade;
                    second.medium_upgrade_expected = upgrade_expected;

                    trial.first_bt_transfer_throughput_kbs = bt;
                    trial.second_wifi_transfer_throughput_kbs = wifi;
                    trial.discoverer_wifi_wlan_latency = discoverer_wlan;
                    trial.discoverer_wifi_wlan_expected = discoverer_expected;
                    trial.advertiser_wifi_wlan_latency = advertiser_wlan;
                    trial.advertiser_wifi_wlan_expected = advertiser_expected;
                    trial
                },
            )
    }
}

mod percentile_properties {
    use super::*;

    proptest! {
        /// Any percentile lies between the smallest and largest sample
        #[test]
        fn percentile_between_min_max(numbers in generators::number_vectors(), p in 0.0f64..=100.0) {
            let min = numbers.iter().fold(f64::INFINITY, |a, &b| a.min(b));
            let max = numbers.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let value = percentile(&numbers, p).unwrap();

            prop_assert!(value >= min - 1e-9);
            prop_assert!(value <= max + 1e-9);
        }

        /// Raising the percentile never lowers the value
        #[test]
        fn percentile_monotonic(numbers in generators::number_vectors(), a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low_value = percentile(&numbers, low).unwrap();
            let high_value = percentile(&numbers, high).unwrap();

            prop_assert!(low_value <= high_value + 1e-9);
        }

        /// Input order does not matter
        #[test]
        fn percentile_ignores_order(numbers in generators::number_vectors(), p in 0.0f64..=100.0) {
            let mut reversed = numbers.clone();
            reversed.reverse();

            prop_assert_eq!(percentile(&numbers, p), percentile(&reversed, p));
        }

        /// The extremes are exactly the min and max samples
        #[test]
        fn percentile_extremes(numbers in generators::number_vectors()) {
            let min = numbers.iter().fold(f64::INFINITY, |a, &b| a.min(b));
            let max = numbers.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

            prop_assert_eq!(percentile(&numbers, 0.0), Some(min));
            prop_assert_eq!(percentile(&numbers, 100.0), Some(max));
        }
    }
}

mod accumulator_properties {
    use super::*;

    proptest! {
        /// No sequence is longer than its expected count, which never exceeds the trial count
        #[test]
        fn sequence_lengths_bounded(trials in vec(generators::trial(), 0..60)) {
            let metrics = QuickStartTestMetrics::from_trials(&trials);

            prop_assert_eq!(metrics.trial_count(), trials.len());
            for series in MetricSeries::ALL {
                prop_assert!(metrics.sample_count(series) <= metrics.expected_count(series));
                prop_assert!(metrics.expected_count(series) <= metrics.trial_count());
            }
        }

        /// Upgrade latencies appear only for trials that expected an upgrade, in trial order
        #[test]
        fn upgrade_latencies_follow_trial_order(trials in vec(generators::trial(), 0..60)) {
            let metrics = QuickStartTestMetrics::from_trials(&trials);
            let expected: Vec<Duration> = trials
                .iter()
                .map(|t| &t.second_connection_setup_quality_info)
                .filter(|q| q.medium_upgrade_expected)
                .filter_map(|q| q.medium_upgrade_latency)
                .collect();

            prop_assert_eq!(metrics.second_medium_upgrade_latencies(), expected.as_slice());
        }

        /// Recording one at a time matches recording in bulk
        #[test]
        fn record_matches_extend(trials in vec(generators::trial(), 0..30)) {
            let mut one_by_one = QuickStartTestMetrics::new();
            for trial in &trials {
                one_by_one.record(trial);
            }

            prop_assert_eq!(one_by_one, QuickStartTestMetrics::from_trials(&trials));
        }
    }
}

mod evaluation_properties {
    use super::*;

    proptest! {
        /// Rates stay within [0, 1] and failures match failing checks
        #[test]
        fn evaluation_rates_bounded(trials in vec(generators::trial(), 0..60)) {
            let metrics = QuickStartTestMetrics::from_trials(&trials);
            let report = MetricsEvaluator::new(&TestParameters::default()).evaluate(&metrics);

            prop_assert!((0.0..=1.0).contains(&report.stats.reach_rate));
            prop_assert!((0.0..=1.0).contains(&report.stats.success_rate));
            prop_assert_eq!(
                report.failures.len(),
                report.checks.iter().filter(|check| !check.passed).count()
            );

            for check in report.checks.iter().filter(|c| c.kind != TargetKind::Throughput) {
                prop_assert!((0.0..=1.0).contains(&check.rate));
            }
        }

        /// Series without samples are never scored
        #[test]
        fn undefined_series_not_scored(trials in vec(generators::trial(), 0..30)) {
            let metrics = QuickStartTestMetrics::from_trials(&trials);
            let report = MetricsEvaluator::new(&TestParameters::default()).evaluate(&metrics);

            for series in &report.undefined_series {
                prop_assert_eq!(metrics.sample_count(*series), 0);
                prop_assert!(!report
                    .checks
                    .iter()
                    .any(|check| check.series == *series && check.kind != TargetKind::Reach));
                if !series.is_gated() {
                    let reach_name = format!("{}_reach", series.name());
                    prop_assert!(report.check(&reach_name).is_none());
                }
            }
        }

        /// Zero targets can always be met by a run that produced every sample
        #[test]
        fn zero_targets_always_pass(trials in vec(generators::trial(), 1..30)) {
            let params = TestParameters {
                bt_transfer_throughput_benchmark_kbs: 0.0,
                wifi_transfer_throughput_benchmark_kbs: 0.0,
                success_rate_target: 0.0,
                reach_rate_target: 0.0,
                ..TestParameters::default()
            };
            let report = MetricsEvaluator::new(&params)
                .evaluate(&QuickStartTestMetrics::from_trials(&trials));
            // A run that measured nothing and expected no gated sample has no reach figure
            prop_assume!(report.checks.iter().any(|check| check.kind == TargetKind::Reach));

            prop_assert!(report.failures.is_empty());
            prop_assert!(report.stats.reach_target);
        }
    }
}
