//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror. Cache operations
//! themselves never fail; these types cover upstream calls and configuration.

use thiserror::Error;

// == Upstream Error Enum ==
/// Failure of a call to the movie metadata API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// No response was received
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its own timeout
    #[error("Request timed out")]
    Timeout,

    /// The API answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl UpstreamError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    // == Status Code ==
    /// HTTP status of the failure, 0 when no response was received.
    pub fn status_code(&self) -> u16 {
        match self {
            UpstreamError::Status { status, .. } => *status,
            UpstreamError::Network(_) | UpstreamError::Timeout => 0,
        }
    }

    // == Is Retryable ==
    /// Whether another attempt could plausibly succeed.
    ///
    /// Network failures, timeouts, 408, 429 and 5xx are transient; any other
    /// status (400, 401, 403, 404, ...) is permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::Timeout => true,
            UpstreamError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
        }
    }

    // == User Message ==
    /// Message suitable for showing to an end user.
    ///
    /// A message supplied by the API wins over the generic per-status text.
    pub fn user_message(&self) -> String {
        let (status, upstream) = match self {
            UpstreamError::Network(_) | UpstreamError::Timeout => {
                return "Network error. Please check your connection.".to_string()
            }
            UpstreamError::Status { status, message } => (*status, message.trim()),
        };

        if !upstream.is_empty() {
            return upstream.to_string();
        }

        match status {
            401 => "Unauthorized. Please check your API key.",
            403 => "Access forbidden.",
            404 => "Resource not found.",
            429 => "Too many requests. Please wait.",
            500 => "Server error. Please try again later.",
            _ => "An unexpected error occurred.",
        }
        .to_string()
    }
}

// == Config Error Enum ==
/// Invalid configuration value read from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but does not parse as a number
    #[error("{var} must be a non-negative integer, got {value:?}")]
    NotANumber { var: &'static str, value: String },

    /// The variable parsed but must be greater than zero
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
}
