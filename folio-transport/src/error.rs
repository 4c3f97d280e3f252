//! Transport error types.

use serde_json::Value;
use thiserror::Error;

/// Message for requests that never got a response.
pub const NETWORK_ERROR_MESSAGE: &str = "Failed to perform the request, please try again later";

/// Message for rejected credentials.
pub const ACCESS_DENIED_MESSAGE: &str = "Access denied";

/// Message used when an error response carries no readable body.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

// ============================================================================
// Transport Error
// ============================================================================

/// Error type for transport calls.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never reached the server or was aborted before a status arrived.
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network(#[source] reqwest::Error),

    /// The server answered 401. The stored token has already been cleared.
    #[error("{}", ACCESS_DENIED_MESSAGE)]
    AccessDenied,

    /// The response declared a content type the transport does not handle.
    #[error("Unsupported content type {0}")]
    UnsupportedContentType(String),

    /// Any other non-success status.
    #[error(transparent)]
    Server(#[from] ServerError),

    /// A successful response whose body could not be read or decoded.
    #[error("Invalid response body: {0}")]
    InvalidBody(String),

    /// The origin or request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The underlying HTTP client could not be created.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl TransportError {
    /// Returns the HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AccessDenied => Some(401),
            Self::Server(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns the machine-readable error code sent by the server.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server(e) => e.code.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the server rejected the credentials.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied)
    }

    /// Returns true if no response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

// ============================================================================
// Server Error
// ============================================================================

/// Error reported by the server with a non-success status.
///
/// The body of an error response is expected to be a JSON object with
/// optional `message`, `code` and `captured` fields. When it is not, the
/// generic [`INTERNAL_ERROR_MESSAGE`] is used. Status and status text are
/// always kept.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ServerError {
    /// Human readable message.
    pub message: String,
    /// Machine-readable error code.
    pub code: Option<String>,
    /// Diagnostic payload captured by the server.
    pub captured: Option<Value>,
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for [`Self::status`], such as `Bad Request`.
    ///
    /// This is not the phrase sent by the server. It is empty for status
    /// codes without a registered reason.
    pub status_text: String,
}

impl ServerError {
    /// Builds a server error from the raw body of an error response.
    pub fn from_body(status: u16, status_text: impl Into<String>, body: &[u8]) -> Self {
        let mut error = Self {
            message: INTERNAL_ERROR_MESSAGE.to_string(),
            code: None,
            captured: None,
            status,
            status_text: status_text.into(),
        };

        // Anything that is not a JSON object keeps the generic message
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return error;
        };

        if let Some(message) = fields.get("message").filter(|v| is_truthy(v)) {
            error.message = value_to_string(message);
        }
        if let Some(code) = fields.get("code").filter(|v| is_truthy(v)) {
            error.code = Some(value_to_string(code));
        }
        if let Some(captured) = fields.get("captured").filter(|v| is_truthy(v)) {
            error.captured = Some(captured.clone());
        }

        error
    }
}

/// Empty strings, zero, `false` and `null` count as "not set".
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Storage Error
// ============================================================================

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Access denied by the backing store.
    #[error("Access denied to storage")]
    AccessDenied,

    /// Storage backend unavailable.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Platform error.
    #[error("Platform error: {0}")]
    Platform(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error.
    #[error("Storage error: {0}")]
    Other(String),
}

impl From<keyring::Error> for StorageError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::Ambiguous(_) => {
                StorageError::Other("Ambiguous credential entry".to_string())
            }
            keyring::Error::PlatformFailure(e) => StorageError::Platform(e.to_string()),
            keyring::Error::NoStorageAccess(_) => StorageError::AccessDenied,
            _ => StorageError::Other(err.to_string()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
