//! Rendering of evaluation reports
//!
//! Two renderings are supported: the full report as pretty JSON for
//! downstream report consumers, and a short verdict summary for terminals.

use crate::{
    error::{AppError, Result},
    stats::{EvaluationReport, FailTargetSummary},
};
use colored::*;
use serde::{Deserialize, Serialize};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full report as pretty JSON
    Json,
    /// One verdict line plus one line per missed target
    Summary,
}

/// Common interface for report formatters
pub trait ReportFormatter {
    fn format_report(&self, report: &EvaluationReport) -> Result<String>;
}

/// Create the formatter for `format`
pub fn create_formatter(format: OutputFormat, enable_color: bool) -> Box<dyn ReportFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Summary => Box::new(SummaryFormatter::new(enable_color)),
    }
}

/// Pretty JSON rendering of the whole report
pub struct JsonFormatter;

impl ReportFormatter for JsonFormatter {
    fn format_report(&self, report: &EvaluationReport) -> Result<String> {
        serde_json::to_string_pretty(report)
            .map_err(|e| AppError::internal(format!("Failed to serialize report: {}", e)))
    }
}

/// Short verdict summary
pub struct SummaryFormatter {
    enable_color: bool,
}

impl SummaryFormatter {
    pub fn new(enable_color: bool) -> Self {
        Self { enable_color }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn format_verdict(&self, report: &EvaluationReport) -> String {
        let verdict = if report.passed() {
            self.colorize("PASS", Color::Green)
        } else {
            self.colorize("FAIL", Color::Red)
        };

        format!(
            "{} {}: {} trials, success rate {}, reach rate {}",
            verdict,
            report.alias,
            report.trial_count,
            format_percentage(report.stats.success_rate),
            format_percentage(report.stats.reach_rate),
        )
    }

    fn format_failure(&self, failure: &FailTargetSummary) -> String {
        format!("  {} {}", self.colorize("missed", Color::Yellow), failure)
    }
}

impl ReportFormatter for SummaryFormatter {
    fn format_report(&self, report: &EvaluationReport) -> Result<String> {
        let mut lines = vec![self.format_verdict(report)];
        lines.extend(report.failures.iter().map(|failure| self.format_failure(failure)));
        Ok(lines.join("\n"))
    }
}

fn format_percentage(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
