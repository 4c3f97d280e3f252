//! Service errors.

use folio_core::CoreError;
use folio_transport::{StorageError, TransportError};
use thiserror::Error;

/// Errors returned by the API services.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The call itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a payload the service cannot use.
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// The model is not valid for the requested operation.
    #[error("Invalid model: {0}")]
    Model(#[from] CoreError),

    /// A request body could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The token could not be stored or removed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Returns true if the server rejected the session.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_access_denied())
    }
}
