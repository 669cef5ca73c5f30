//! Configuration management for custweb
//!
//! This module handles loading, validation, and management of
//! custweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

/// Remote services the console talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Customer and transaction API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Synthetic data generator
    #[serde(default = "default_generator_base_url")]
    pub generator_base_url: String,
    /// Upper bound for a single upstream request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Requests in flight at once when totalling the customer list
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            generator_base_url: default_generator_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_generator_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_requests() -> usize {
    8
}

/// Transaction screen settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsConfig {
    /// Initial filter window of a transaction screen, in months back from today
    #[serde(default = "default_window_months")]
    pub default_window_months: u32,
    /// Window used for the per-customer totals on the customer list
    #[serde(default = "default_summary_window_months")]
    pub summary_window_months: u32,
}

impl Default for TransactionsConfig {
    fn default() -> Self {
        Self {
            default_window_months: default_window_months(),
            summary_window_months: default_summary_window_months(),
        }
    }
}

fn default_window_months() -> u32 {
    1
}

fn default_summary_window_months() -> u32 {
    12
}

/// Generator limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Maximum transactions per generation request
    #[serde(default = "default_max_transactions")]
    pub max_transactions: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_transactions: default_max_transactions(),
        }
    }
}

fn default_max_transactions() -> u32 {
    5000
}

/// Open transaction screen registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreensConfig {
    /// Number of transaction screens kept in memory; the oldest is evicted first
    #[serde(default = "default_max_open")]
    pub max_open: usize,
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self {
            max_open: default_max_open(),
        }
    }
}

fn default_max_open() -> usize {
    64
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
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
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream service settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Transaction screen settings
    #[serde(default)]
    pub transactions: TransactionsConfig,
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Screen registry settings
    #[serde(default)]
    pub screens: ScreensConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Unreadable {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        for (field, url) in [
            ("upstream.api_base_url", &self.upstream.api_base_url),
            ("upstream.generator_base_url", &self.upstream.generator_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "URL must start with http:// or https://".to_string(),
                });
            }
        }

        if self.upstream.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.request_timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if self.upstream.max_concurrent_requests == 0 {
            return Err(ConfigError::InvalidValue {
                field: "upstream.max_concurrent_requests".to_string(),
                reason: "At least one request must be allowed".to_string(),
            });
        }

        if self.transactions.default_window_months < 1 || self.transactions.default_window_months > 24 {
            return Err(ConfigError::InvalidValue {
                field: "transactions.default_window_months".to_string(),
                reason: "Window must be between 1 and 24 months".to_string(),
            });
        }

        if self.transactions.summary_window_months < 1 {
            return Err(ConfigError::InvalidValue {
                field: "transactions.summary_window_months".to_string(),
                reason: "Window must be at least 1 month".to_string(),
            });
        }

        if self.generator.max_transactions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generator.max_transactions".to_string(),
                reason: "Limit must be greater than 0".to_string(),
            });
        }

        if self.screens.max_open == 0 {
            return Err(ConfigError::InvalidValue {
                field: "screens.max_open".to_string(),
                reason: "At least one screen must be allowed".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Upstream request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.request_timeout_secs)
    }

    /// Listen address of the console
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.server.port, 8082);
        assert_eq!(config.upstream.api_base_url, "http://localhost:8080");
        assert_eq!(config.upstream.generator_base_url, "http://localhost:8081");
        assert_eq!(config.transactions.default_window_months, 1);
        assert_eq!(config.generator.max_transactions, 5000);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.upstream.max_concurrent_requests, 8);
    }

    #[test]
    fn test_partial_section() {
        let yaml = "upstream:\n  api_base_url: http://api.internal:9000\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.upstream.api_base_url, "http://api.internal:9000");
        assert_eq!(config.upstream.request_timeout_secs, 10);
    }

    #[test]
    fn test_default_template_is_valid() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8082");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_yaml("upstream:\n  request_timeout_secs: 0\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "upstream.request_timeout_secs"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_url_rejected() {
        let err = Config::from_yaml("upstream:\n  api_base_url: localhost:8080\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server:\n  port: [1, 2\n").unwrap_err();
        match err {
            ConfigError::InvalidYaml { message } => assert!(message.contains("line"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_type_reports_location() {
        let err = Config::from_yaml("server:\n  port: eighty\n").unwrap_err();
        match err {
            ConfigError::InvalidYaml { message } => {
                assert!(message.contains("server.port") || message.contains("line 2"), "{message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(PathBuf::from("/nonexistent/custweb.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
