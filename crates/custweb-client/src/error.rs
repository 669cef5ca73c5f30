//! Error types for custweb-client

use thiserror::Error;

/// Failure talking to a remote service
#[derive(Error, Debug, Clone)]
pub enum ClientError {
    /// Request could not be sent or the connection broke
    #[error("Request failed: {message}")]
    Request { message: String },

    #[error("Request timed out")]
    Timeout,

    /// Service answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl ClientError {
    /// HTTP status, when the service answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Message suitable for an operator notice
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ClientError::Timeout
        } else if error.is_decode() {
            ClientError::Decode { message: error.to_string() }
        } else {
            ClientError::Request { message: error.to_string() }
        }
    }
}

/// Result type with ClientError
pub type ClientResult<T> = Result<T, ClientError>;
