//! Error types for custweb-core
//!
//! Every failure of the console logic maps to a `CoreError` carrying an
//! error code, a severity and resolution suggestions for the UI.

use custweb_client::ClientError;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Upstream request failed, timed out or answered non-success
    NetworkFailure,
    /// Date range could not be parsed
    InvalidRange,
    /// Form input rejected before any request
    InvalidInput,
    /// Customer does not exist upstream
    CustomerNotFound,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NetworkFailure => write!(f, "NETWORK_FAILURE"),
            ErrorCode::InvalidRange => write!(f, "INVALID_RANGE"),
            ErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
            ErrorCode::CustomerNotFound => write!(f, "CUSTOMER_NOT_FOUND"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for custweb-core
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("Network failure during {operation}: {message}")]
    NetworkFailure { operation: String, message: String },

    #[error("Invalid date range: {message}")]
    InvalidRange { message: String },

    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Customer not found: {id}")]
    CustomerNotFound { id: String },
}

impl CoreError {
    /// Wrap a client failure for the named operation
    pub fn network(operation: &str, error: &ClientError) -> Self {
        CoreError::NetworkFailure {
            operation: operation.to_string(),
            message: error.user_message(),
        }
    }

    /// Map a client failure on a customer lookup; 404 becomes `CustomerNotFound`
    pub fn from_customer_lookup(customer_id: &str, error: &ClientError) -> Self {
        if error.is_not_found() {
            CoreError::CustomerNotFound { id: customer_id.to_string() }
        } else {
            Self::network("customer lookup", error)
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NetworkFailure { .. } => ErrorCode::NetworkFailure,
            CoreError::InvalidRange { .. } => ErrorCode::InvalidRange,
            CoreError::InvalidInput { .. } => ErrorCode::InvalidInput,
            CoreError::CustomerNotFound { .. } => ErrorCode::CustomerNotFound,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NetworkFailure { .. } => ErrorSeverity::Error,
            CoreError::InvalidRange { .. } => ErrorSeverity::Warning,
            CoreError::InvalidInput { .. } => ErrorSeverity::Warning,
            CoreError::CustomerNotFound { .. } => ErrorSeverity::Info,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::NetworkFailure { operation, message } => {
                details = details.with_detail(serde_json::json!({
                    "operation": operation,
                    "upstream_message": message,
                }));
                details = details.with_suggestion(
                    "Check that the upstream service is reachable.".to_string()
                );
                details = details.with_suggestion(
                    "The page keeps showing the last known data; retry the action.".to_string()
                );
            }
            CoreError::InvalidRange { .. } => {
                details = details.with_suggestion(
                    "Dates must use the YYYY-MM-DD format.".to_string()
                );
            }
            CoreError::InvalidInput { field, .. } => {
                details = details.with_detail(serde_json::json!({ "field": field }));
            }
            CoreError::CustomerNotFound { .. } => {
                details = details.with_suggestion(
                    "Return to the customer list and pick an existing customer.".to_string()
                );
            }
        }

        details
    }

    /// Log through the `log` facade at a level matching the severity
    pub fn log(&self, context: &str) {
        match self.severity() {
            ErrorSeverity::Error => log::error!(target: "custweb::error", "[{}] {} - {}", self.code(), context, self),
            ErrorSeverity::Warning => log::warn!(target: "custweb::error", "[{}] {} - {}", self.code(), context, self),
            ErrorSeverity::Info => log::info!(target: "custweb::error", "[{}] {} - {}", self.code(), context, self),
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================
