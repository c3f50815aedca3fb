//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::report::OutputFormat;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the log level or output format is unknown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        self.output.format()?;
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Report output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Report format: "text", "json" or "csv".
    #[serde(default = "default_format")]
    pub format: String,
}

impl OutputConfig {
    /// Parses the configured format.
    ///
    /// # Errors
    ///
    /// Returns an error if the format name is unknown.
    pub fn format(&self) -> Result<OutputFormat, ConfigError> {
        self.format
            .parse()
            .map_err(|message| ConfigError::ValidationError { message })
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

/// Validation configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Treat warnings as failures when deciding the exit code.
    #[serde(default)]
    pub warnings_as_errors: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.output.format().unwrap(), OutputFormat::Text);
        assert!(!config.validation.warnings_as_errors);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "logging": { "level": "debug" },
            "output": { "format": "csv" },
            "validation": { "warnings_as_errors": true }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.output.format().unwrap(), OutputFormat::Csv);
        assert!(config.validation.warnings_as_errors);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let config: Config =
            serde_json::from_str(r#"{ "logging": { "level": "INFO" } }"#).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_invalid_log_level() {
        let config: Config =
            serde_json::from_str(r#"{ "logging": { "level": "loud" } }"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_invalid_format() {
        let config: Config =
            serde_json::from_str(r#"{ "output": { "format": "xml" } }"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn reject_unknown_fields() {
        let result: Result<Config, _> = serde_json::from_str(r#"{ "unknown_field": "value" }"#);
        assert!(result.is_err());

        let result: Result<Config, _> =
            serde_json::from_str(r#"{ "validation": { "strict": true } }"#);
        assert!(result.is_err());
    }
}
