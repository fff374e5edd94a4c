//! Structured logging for metrics evaluation runs
//!
//! This module provides:
//! - Structured log entries with levels and free-form fields
//! - Console and JSON renderings
//! - A session correlation id shared by every logger of one run
//! - A metrics logger that records trials, missed targets and verdicts
//!
//! All output goes to stderr so stdout carries only the rendered report.

use crate::config::ValidationWarning;
use crate::error::{AppError, Result};
use crate::models::SingleTestResult;
use crate::stats::{EvaluationReport, FailTargetSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    /// Per-trial records
    Debug = 1,
    /// Run progress and the final verdict
    Info = 2,
    /// Missed targets and parameter warnings
    Warn = 3,
    Error = 4,
    /// Errors that end the run
    Fatal = 5,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// ANSI escape used for the level tag on a terminal
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }

    /// Level implied by the CLI flags: debug wins over verbose
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that emitted the entry
    pub logger: String,
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
    pub location: Option<LogLocation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLocation {
    pub file: String,
    pub line: u32,
    pub module: Option<String>,
}

/// How entries are rendered on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Timestamp, level, component, message and sorted fields
    Console,
    /// One JSON object per line
    Json,
}

/// Session id and fields attached to every entry of one logger
#[derive(Debug, Default)]
struct LogContext {
    session_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger with level filtering and multiple output formats
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    include_location: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    /// Create a new logger
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            include_location: false,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger configured from the CLI flags.
    ///
    /// Debug selects JSON output with source locations, verbose selects
    /// info-level console output, otherwise only warnings are shown.
    pub fn with_flags(name: String, verbose: bool, debug: bool, use_color: bool) -> Self {
        Self {
            min_level: LogLevel::from_flags(verbose, debug),
            use_color,
            include_location: debug,
            format: if debug { LogFormat::Json } else { LogFormat::Console },
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn set_session_id(&self, session_id: String) {
        if let Ok(mut context) = self.context.write() {
            context.session_id = Some(session_id);
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.context.read().ok().and_then(|context| context.session_id.clone())
    }

    /// Attach `key` to every later entry
    pub fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            if let Ok(mut context) = self.context.write() {
                context.context_fields.insert(key, json_value);
            }
        }
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Fatal, message)
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Render an entry with context fields applied, or `None` if filtered out
    fn render(&self, mut entry: LogEntry) -> Option<String> {
        if !self.would_log(entry.level) {
            return None;
        }

        if let Ok(context) = self.context.read() {
            if let Some(session_id) = &context.session_id {
                entry
                    .fields
                    .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
            }
            for (key, value) in &context.context_fields {
                entry.fields.insert(key.clone(), value.clone());
            }
        }

        Some(match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
        })
    }

    fn write_entry(&self, entry: LogEntry) {
        if let Some(output) = self.render(entry) {
            let _ = writeln!(io::stderr(), "{}", output);
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields_str: Vec<String> = entry
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            fields_str.sort();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        if self.include_location {
            if let Some(location) = &entry.location {
                output.push_str(&format!(" @ {}:{}", location.file, location.line));
            }
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => serde_json::json!({
                "error": "Failed to serialize log entry",
                "message": entry.message,
            })
            .to_string(),
        }
    }
}

/// Collects fields for one entry; nothing is written until [`LogEntryBuilder::log`]
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                correlation_id: None,
                fields: HashMap::new(),
                location: None,
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Attach a field; values that fail to serialize are dropped
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    pub fn location(mut self, file: &str, line: u32, module: Option<&str>) -> Self {
        self.entry.location = Some(LogLocation {
            file: file.to_string(),
            line,
            module: module.map(String::from),
        });
        self
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    pub fn log(self) {
        self.logger.write_entry(self.entry);
    }
}

/// Logger for the lifecycle of one metrics run
pub struct MetricsLogger {
    logger: Logger,
}

impl MetricsLogger {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Log one recorded trial with both connection summaries
    pub fn log_trial(&self, index: usize, trial: &SingleTestResult) {
        if !self.logger.would_log(LogLevel::Debug) {
            return;
        }

        self.logger
            .debug(&format!("Recorded trial {}", index + 1))
            .field("trial", index + 1)
            .field("first_connection", trial.first_connection_setup_quality_info.to_string())
            .field("second_connection", trial.second_connection_setup_quality_info.to_string())
            .field("bt_throughput_kbs", trial.first_bt_transfer_throughput_kbs)
            .field("wifi_throughput_kbs", trial.second_wifi_transfer_throughput_kbs)
            .log();
    }

    /// Log a missed target
    pub fn log_failure(&self, failure: &FailTargetSummary) {
        self.logger
            .warn(&format!("Target missed: {}", failure.name))
            .field("target", &failure.name)
            .field("rate", failure.rate)
            .field("goal", failure.goal)
            .log();
    }

    /// Log the final verdict and every missed target
    pub fn log_report(&self, report: &EvaluationReport) {
        for failure in &report.failures {
            self.log_failure(failure);
        }

        self.logger
            .info(&format!(
                "Run '{}' {}",
                report.alias,
                if report.passed() { "passed" } else { "failed" }
            ))
            .field("trials", report.trial_count)
            .field("success_rate", report.stats.success_rate)
            .field("reach_rate", report.stats.reach_rate)
            .field("reach_target", report.stats.reach_target)
            .field("undefined_series", &report.undefined_series)
            .log();
    }

    pub fn log_validation_warning(&self, warning: &ValidationWarning) {
        self.logger
            .warn(&warning.message)
            .field("validation_level", warning.level.as_str())
            .log();
    }

    pub fn log_error(&self, error: &AppError) {
        self.logger.error(&error.to_string()).error_info(error).log();
    }
}

/// Creates loggers that share one session id
pub struct LoggerFactory {
    verbose: bool,
    debug: bool,
    use_color: bool,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(verbose: bool, debug: bool, use_color: bool) -> Self {
        Self {
            verbose,
            debug,
            use_color,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn create_logger(&self, name: &str) -> Logger {
        let logger = Logger::with_flags(name.to_string(), self.verbose, self.debug, self.use_color);
        logger.set_session_id(self.session_id.clone());
        logger
    }

    pub fn create_metrics_logger(&self) -> MetricsLogger {
        MetricsLogger::new(self.create_logger("METRICS"))
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Log at debug level with source location
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        $logger.debug(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
    };
}

/// Log at info level with source location
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        $logger.info(&format!($($arg)*))
            .location(file!(), line!(), Some(module_path!()))
            .log()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn entry(level: LogLevel) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: "Test message".to_string(),
            logger: "TEST".to_string(),
            correlation_id: Some("test-id-0123".to_string()),
            fields: {
                let mut map = HashMap::new();
                map.insert("key".to_string(), serde_json::Value::String("value".to_string()));
                map
            },
            location: Some(LogLocation {
                file: "src/app.rs".to_string(),
                line: 42,
                module: None,
            }),
        }
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_debug_is_below_warn() {
        let logger = Logger::with_flags("TEST".to_string(), true, false, false);
        assert!(LogLevel::Debug < LogLevel::Warn);
        assert!(!logger.would_log(LogLevel::Debug));
        assert!(logger.would_log(LogLevel::Fatal));
    }

    #[test]
    fn test_level_from_flags() {
        assert_eq!(LogLevel::from_flags(false, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_flags(true, false), LogLevel::Info);
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Debug);
    }

    #[test]
    fn test_logger_with_flags() {
        let quiet = Logger::with_flags("TEST".to_string(), false, false, false);
        assert!(!quiet.would_log(LogLevel::Info));
        assert!(quiet.would_log(LogLevel::Warn));
        assert_eq!(quiet.format, LogFormat::Console);

        let debug = Logger::with_flags("TEST".to_string(), false, true, false);
        assert!(debug.would_log(LogLevel::Debug));
        assert!(!debug.would_log(LogLevel::Trace));
        assert_eq!(debug.format, LogFormat::Json);
    }

    #[test]
    fn test_render_filters_and_applies_context() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_format(LogFormat::Json);
        logger.set_session_id("session-1".to_string());
        logger.add_context_field("alias".to_string(), "lab-a");

        assert!(logger.render(entry(LogLevel::Debug)).is_none());

        let rendered = logger.render(entry(LogLevel::Warn)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["fields"]["session_id"], "session-1");
        assert_eq!(value["fields"]["alias"], "lab-a");
        assert_eq!(value["level"], "Warn");
    }

    #[test]
    fn test_log_formats() {
        let mut logger = Logger::new("TEST".to_string());
        logger.set_color(false);
        let entry = entry(LogLevel::Info);

        let console_output = logger.format_console(&entry);
        assert!(console_output.contains(" INFO [TEST] Test message [test-id-]"));
        assert!(console_output.contains("{key=\"value\"}"));
        assert!(!console_output.contains("src/app.rs"));

        let value: serde_json::Value = serde_json::from_str(&logger.format_json(&entry)).unwrap();
        assert_eq!(value["logger"], "TEST");
        assert_eq!(value["location"]["line"], 42);
    }

    #[test]
    fn test_short_correlation_id() {
        let logger = Logger::with_flags("TEST".to_string(), false, true, false);
        let mut entry = entry(LogLevel::Info);
        entry.correlation_id = Some("abc".to_string());

        let output = logger.format_console(&entry);
        assert!(output.contains("[abc]"));
        assert!(output.ends_with("@ src/app.rs:42"));
    }

    #[test]
    fn test_factory_shares_session_id() {
        let factory = LoggerFactory::new(false, false, false);
        let first = factory.create_logger("A");
        let second = factory.create_metrics_logger();

        assert_eq!(first.session_id().as_deref(), Some(factory.session_id()));
        assert_eq!(second.logger().session_id().as_deref(), Some(factory.session_id()));
        assert!(Uuid::parse_str(factory.session_id()).is_ok());
    }

    #[test]
    fn test_log_entry_serialization() {
        let json = serde_json::to_string(&entry(LogLevel::Error)).unwrap();
        let parsed: LogEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.level, LogLevel::Error);
        assert_eq!(parsed.fields["key"], "value");
        assert_eq!(parsed.location.unwrap().line, 42);
    }

    #[test]
    fn test_metrics_logger_does_not_panic() {
        let metrics_logger = LoggerFactory::new(true, true, false).create_metrics_logger();
        metrics_logger.log_trial(0, &SingleTestResult::new());
        metrics_logger.log_failure(&FailTargetSummary::new("x_reach", 0.5, 0.95));
        metrics_logger.log_error(&AppError::internal("boom"));
    }
}
