//! Error types for the simulation data model.

use thiserror::Error;

/// Errors raised while decoding a response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The body is not a JSON document (even allowing `NaN`/`Infinity`),
    /// or it is nested deeper than [`MAX_DEPTH`](crate::MAX_DEPTH).
    #[error("invalid payload: {0}")]
    PayloadSyntax(String),
}

impl From<json5::Error> for ModelError {
    fn from(err: json5::Error) -> Self {
        Self::PayloadSyntax(err.to_string())
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
