//! Error types for custweb-config

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Cannot read {path}: {message}")]
    Unreadable { path: String, message: String },

    /// `message` carries the parser's line and column
    #[error("Invalid YAML: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// What the operator can do about it, printed at startup
    pub fn hint(&self) -> Option<String> {
        match self {
            ConfigError::FileNotFound { .. } => {
                Some("Run with --print-default-config to get a starting file.".to_string())
            }
            ConfigError::Unreadable { .. } => None,
            ConfigError::InvalidYaml { .. } => {
                Some("Compare the file against the output of --print-default-config.".to_string())
            }
            ConfigError::InvalidValue { field, .. } => {
                Some(format!("Fix `{}` or remove it to use the default.", field))
            }
        }
    }
}
