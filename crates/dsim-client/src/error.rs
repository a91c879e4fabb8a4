//! Error types for service requests.

use dsim_model::{ModelError, Payload};
use thiserror::Error;

/// Message shown when the service gives no usable explanation.
pub const GENERIC_FAILURE: &str = "Server connection failed.";

/// Errors that can occur while talking to the prediction service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// No response: connection refused, DNS failure, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with an error status.
    #[error("server returned HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Server {
        status: u16,
        /// The body's `error` field, when present.
        message: Option<String>,
    },

    /// A success response whose body could not be parsed.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Builds an error from a failed response, keeping the body's `error`
    /// field when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Server {
            status,
            message: extract_error_message(body),
        }
    }

    /// Returns the message to show the user.
    ///
    /// This is the service's own `error` text when it sent one, otherwise
    /// [`GENERIC_FAILURE`].
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Server {
                message: Some(message),
                ..
            } => message.as_str(),
            Self::Build(_) | Self::Network(_) | Self::Server { .. } | Self::InvalidResponse(_) => {
                GENERIC_FAILURE
            }
        }
    }

    /// Returns whether a retry could succeed.
    ///
    /// Only transport failures qualify. The service already processed any
    /// request that got an HTTP status back.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reads a non-empty string `error` field from a response body.
pub fn extract_error_message(body: &str) -> Option<String> {
    let payload = Payload::parse(body).ok()?;
    let message = payload.get("error")?.as_str()?;
    (!message.is_empty()).then(|| message.to_string())
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
