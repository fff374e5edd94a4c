//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, validate_config, EnvManager},
    error::{AppError, ErrorContext, Result},
    log_debug, log_info,
    logging::LoggerFactory,
    models::{QuickStartTestMetrics, SingleTestResult},
    output::create_formatter,
    stats::{EvaluationReport, MetricsEvaluator},
};
use std::path::Path;

/// Result of one evaluation run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: EvaluationReport,
    /// Report rendered in the requested output format
    pub rendered: String,
}

impl RunOutcome {
    /// Process exit code: 0 when every target was met
    pub fn exit_code(&self) -> i32 {
        if self.report.passed() {
            0
        } else {
            crate::defaults::EXIT_TARGETS_MISSED
        }
    }
}

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::validation)?;
        Ok(Self { cli })
    }

    /// Text of an informational flag that replaces the evaluation, if one was given
    pub fn info_output(&self) -> Result<Option<String>> {
        if self.cli.env_help {
            return Ok(Some(EnvManager::display_env_help()));
        }

        if let Some(path) = &self.cli.create_env_example {
            EnvManager::save_example_env_file(path)?;
            return Ok(Some(format!("Wrote example environment file to {}", path.display())));
        }

        Ok(None)
    }

    /// Load parameters and trials, record every trial, evaluate and render
    pub fn run(&self) -> Result<RunOutcome> {
        let trials_path = self
            .cli
            .trials
            .as_deref()
            .ok_or_else(|| AppError::validation("--trials is required"))?;

        let use_color = self.cli.use_colors();
        let factory = LoggerFactory::new(self.cli.verbose, self.cli.debug, use_color);
        let metrics_logger = factory.create_metrics_logger();
        let logger = metrics_logger.logger();

        log_debug!(
            logger,
            "{} v{} (built {}, commit {})",
            crate::PKG_NAME,
            crate::VERSION,
            crate::BUILD_TIME,
            crate::GIT_COMMIT.unwrap_or("unknown")
        );

        let params = match load_config(self.cli.clone()) {
            Ok(params) => params,
            Err(e) => {
                metrics_logger.log_error(&e);
                return Err(e);
            }
        };
        logger.add_context_field("alias".to_string(), &params.test_report_alias_name);

        for warning in validate_config(&params)? {
            metrics_logger.log_validation_warning(&warning);
        }
        log_debug!(logger, "Parameters:\n{}", display_config_summary(&params));

        let trials = load_trials(trials_path)?;
        log_info!(logger, "Loaded {} trials from {}", trials.len(), trials_path.display());

        let mut metrics = QuickStartTestMetrics::new();
        for (index, trial) in trials.iter().enumerate() {
            metrics.record(trial);
            metrics_logger.log_trial(index, trial);
        }

        let report = MetricsEvaluator::new(&params).evaluate(&metrics);
        metrics_logger.log_report(&report);

        let rendered = create_formatter(self.cli.format, use_color).format_report(&report)?;

        Ok(RunOutcome { report, rendered })
    }
}

/// Read a JSON array of trial results
pub fn load_trials(path: &Path) -> Result<Vec<SingleTestResult>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trials file {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Invalid trials file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_app_rejects_conflicting_flags() {
        let cli = Cli::parse_from(["ncperf", "--trials", "t.json", "--color", "--no-color"]);
        let result = App::new(cli);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_info_output_writes_example_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("example.env");
        let cli = Cli::parse_from(["ncperf", "--create-env-example", path.to_str().unwrap()]);

        let info = App::new(cli).unwrap().info_output().unwrap().unwrap();

        assert!(info.contains("example.env"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# NC_UPGRADE_MEDIUM=UPGRADE_TO_ALL_WIFI"));
    }

    #[test]
    fn test_info_output_absent_for_evaluation_runs() {
        let cli = Cli::parse_from(["ncperf", "--trials", "t.json"]);
        assert_eq!(App::new(cli).unwrap().info_output().unwrap(), None);

        let cli = Cli::parse_from(["ncperf", "--env-help"]);
        let help = App::new(cli).unwrap().info_output().unwrap().unwrap();
        assert!(help.contains("NC_REACH_RATE_TARGET"));
    }

    #[test]
    fn test_load_trials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trials.json");
        std::fs::write(
            &path,
            r#"[
                {"first_connection_setup_quality_info": {"discovery_latency": 1.5, "connection_latency": 3.0},
                 "first_bt_transfer_throughput_kbs": 25.0},
                {}
            ]"#,
        )
        .unwrap();

        let trials = load_trials(&path).unwrap();

        assert_eq!(trials.len(), 2);
        assert_eq!(trials[0].first_bt_transfer_throughput_kbs, Some(25.0));
        assert_eq!(trials[1], SingleTestResult::default());
    }

    #[test]
    fn test_load_trials_errors_keep_category() {
        let dir = TempDir::new().unwrap();

        let missing = load_trials(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, AppError::Io(_)));
        assert_eq!(missing.exit_code(), 5);

        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"not": "an array"}"#).unwrap();
        let bad = load_trials(&path).unwrap_err();
        assert!(matches!(bad, AppError::Parse(_)));
        assert!(bad.to_string().contains("bad.json"));
    }
}
