//! # Configuration Error Types
//!
//! Structured errors for configuration loading and validation using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, parsing or validating configuration
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to read configuration file {path}: {message}")]
    FileReadError { path: String, message: String },

    #[error("Configuration file not found; searched: {searched_paths:?}")]
    ConfigFileNotFound { searched_paths: Vec<PathBuf> },

    #[error("Invalid YAML in {file}: {message}")]
    InvalidYaml { file: String, message: String },

    #[error("Invalid value for {field}: {value}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}: {context}")]
    MissingRequiredField { field: String, context: String },
}

impl ConfigurationError {
    /// Create a file read error
    pub fn file_read_error(path: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::FileReadError {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a config file not found error
    pub fn config_file_not_found(searched_paths: Vec<PathBuf>) -> Self {
        Self::ConfigFileNotFound { searched_paths }
    }

    /// Create an invalid YAML error
    pub fn invalid_yaml(file: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidYaml {
            file: file.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing required field error
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let read_err = ConfigurationError::file_read_error("config/app.yaml", "permission denied");
        assert!(matches!(read_err, ConfigurationError::FileReadError { .. }));

        let value_err = ConfigurationError::invalid_value(
            "circuit_breakers.default.failure_threshold",
            "0",
            "failure threshold must be at least 1",
        );
        assert!(matches!(value_err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_error_display() {
        let not_found =
            ConfigurationError::config_file_not_found(vec![PathBuf::from("config/app.yaml")]);
        let display_str = format!("{not_found}");
        assert!(display_str.contains("Configuration file not found"));
        assert!(display_str.contains("app.yaml"));

        let missing = ConfigurationError::missing_required_field(
            "circuit_breakers.dependencies",
            "dependency names must be non-empty",
        );
        let display_str = format!("{missing}");
        assert!(display_str.contains("Missing required configuration field"));
        assert!(display_str.contains("circuit_breakers.dependencies"));
    }
}
