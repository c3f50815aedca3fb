//! Error types for parchmint-check configuration and reporting.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors that can occur while rendering a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// JSON serialisation failed.
    #[error("failed to serialise JSON report")]
    Json(#[from] serde_json::Error),

    /// CSV serialisation failed.
    #[error("failed to write CSV report")]
    Csv(#[from] csv::Error),

    /// Flushing the report buffer failed.
    #[error("failed to flush report: {0}")]
    Io(#[from] std::io::Error),

    /// The rendered report is not UTF-8.
    #[error("report is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/home/user/.parchmint/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains(".parchmint"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "unknown output format 'xml'".to_string(),
        };
        assert!(error.to_string().contains("'xml'"));
    }
}
