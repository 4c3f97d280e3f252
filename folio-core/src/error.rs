//! Core error types for Folio.

use thiserror::Error;

/// Core error type for Folio model operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An enum name the API sent is not known to this client.
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Which enum was being parsed.
        kind: &'static str,
        /// The offending value.
        value: String,
    },

    /// A required field is missing for the requested operation.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
