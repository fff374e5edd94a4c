//! Error handling for the Nearby performance metrics toolkit

use thiserror::Error;

/// Custom error types for metrics evaluation
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid parameters, bad env values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Trial or parameter files could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (JSON, enum names, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Short tag used in console output and log fields
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Hints at which input to fix, printed under the error
    pub fn suggestions(&self) -> &'static [&'static str] {
        match self {
            Self::Config(_) => &[
                "Configuration help:",
                "  - Parameter files are JSON objects; missing fields take defaults",
                "  - Mediums accept a code (0-9) or a name such as UPGRADE_TO_WIFIDIRECT",
                "  - Run --env-help to list the NC_* variables and their formats",
                "  - Run with --debug to see the resolved parameters",
            ],
            Self::Validation(_) => &[
                "Percentiles are 0-100, benchmarks >= 0 KB/s and rate targets 0.0-1.0.",
            ],
            Self::Parse(_) => &[
                "Trial file help:",
                "  - The trials file must be a JSON array, one object per trial",
                "  - Latencies are seconds, throughputs are KB/s",
            ],
            Self::Io(_) => &["Check that the --trials path exists and is readable."],
            Self::Internal(_) => &["This is likely a bug. Please report it with the trial file that triggered it."],
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::Io(_) => 5,
            Self::Internal(_) => 99,
        }
    }

    /// `[CATEGORY] message`, colored by severity when enabled
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Failed to load .env file: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Invalid integer: {}", error))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(error: std::num::ParseFloatError) -> Self {
        Self::parse(format!("Invalid number: {}", error))
    }
}

impl From<std::str::ParseBoolError> for AppError {
    fn from(error: std::str::ParseBoolError) -> Self {
        Self::parse(format!("Invalid boolean: {}", error))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Prefix an error with what was being attempted, keeping its category
pub trait ErrorContext<T> {
    /// Add context to an error
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let original_error = e.into();
            let context = f();
            match original_error {
                AppError::Io(msg) => AppError::io(format!("{}: {}", context, msg)),
                AppError::Parse(msg) => AppError::parse(format!("{}: {}", context, msg)),
                AppError::Config(msg) => AppError::config(format!("{}: {}", context, msg)),
                other => AppError::internal(format!("{}: {}", context, other)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = AppError::config("bad percentile");
        assert!(matches!(error, AppError::Config(_)));

        let error = AppError::internal("report serialization");
        assert!(matches!(error, AppError::Internal(_)));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::validation("percentile must be within 0..=100");
        assert_eq!(error.to_string(), "Validation error: percentile must be within 0..=100");
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(AppError::config("x").category(), "CONFIG");
        assert_eq!(AppError::validation("x").category(), "VALIDATION");
        assert_eq!(AppError::io("x").category(), "IO");
        assert_eq!(AppError::parse("x").category(), "PARSE");
        assert_eq!(AppError::internal("x").category(), "INTERNAL");
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::config("x").exit_code(), 1);
        assert_eq!(AppError::parse("x").exit_code(), 1);
        assert_eq!(AppError::io("x").exit_code(), 5);
        assert_eq!(AppError::internal("x").exit_code(), 99);
    }

    #[test]
    fn test_every_category_has_suggestions() {
        let errors = [
            AppError::config("x"),
            AppError::validation("x"),
            AppError::io("x"),
            AppError::parse("x"),
            AppError::internal("x"),
        ];
        for error in &errors {
            assert!(!error.suggestions().is_empty(), "{}", error.category());
        }

        let parse = AppError::parse("expected `[`").suggestions();
        assert!(parse.iter().any(|line| line.contains("JSON array")));
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "trials.json");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));

        let parse_error = "abc".parse::<u8>().unwrap_err();
        let app_error: AppError = parse_error.into();
        assert!(matches!(app_error, AppError::Parse(_)));

        let json_error = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::Parse(_)));
    }

    #[test]
    fn test_error_context() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let error = result.with_context(|| "Reading trials.json".to_string()).unwrap_err();

        assert!(matches!(error, AppError::Io(_)));
        assert!(error.to_string().contains("Reading trials.json"));
    }

    #[test]
    fn test_console_format_without_color() {
        let formatted = AppError::parse("unexpected token").format_for_console(false);
        assert_eq!(formatted, "[PARSE] Parsing error: unexpected token");
    }
}
