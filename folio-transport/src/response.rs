//! Response classification by declared content type.

use reqwest::{header, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

// ============================================================================
// Content Kind
// ============================================================================

/// What a successful response carries, decided from status and content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentKind {
    /// 204, or no content type at all.
    Empty,
    /// `application/json`
    Json,
    /// `text/plain`
    Text,
    /// `application/octet-stream`
    Binary,
    /// Anything else.
    Unsupported(String),
}

impl ContentKind {
    /// Classifies a response from its status and `Content-Type` header.
    ///
    /// Media types are matched case-insensitively by substring, so
    /// parameters such as `charset` do not matter.
    pub fn detect(status: StatusCode, content_type: Option<&str>) -> Self {
        if status == StatusCode::NO_CONTENT {
            return Self::Empty;
        }
        let Some(content_type) = content_type else {
            return Self::Empty;
        };

        let lowered = content_type.to_ascii_lowercase();
        if lowered.contains("application/json") {
            Self::Json
        } else if lowered.contains("text/plain") {
            Self::Text
        } else if lowered.contains("application/octet-stream") {
            Self::Binary
        } else {
            Self::Unsupported(content_type.to_string())
        }
    }
}

// ============================================================================
// Payload
// ============================================================================

/// Result of a successful call.
#[derive(Debug)]
pub enum Payload {
    /// No content.
    Empty,
    /// Decoded JSON body.
    Json(Value),
    /// Plain text body.
    Text(String),
    /// The raw response, for binary and file downloads.
    Binary(Response),
}

impl Payload {
    /// Turns a successful response into a payload.
    ///
    /// # Errors
    ///
    /// Fails with [`TransportError::UnsupportedContentType`] for unknown
    /// content types and [`TransportError::InvalidBody`] when the body
    /// cannot be read or decoded.
    pub async fn classify(response: Response) -> Result<Self, TransportError> {
        let content_type = match response.headers().get(header::CONTENT_TYPE) {
            None => None,
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| {
                        TransportError::UnsupportedContentType(
                            String::from_utf8_lossy(value.as_bytes()).into_owned(),
                        )
                    })?
                    .to_string(),
            ),
        };

        let kind = ContentKind::detect(response.status(), content_type.as_deref());
        debug!(status = %response.status(), kind = ?kind, "Classifying response");

        match kind {
            ContentKind::Empty => Ok(Self::Empty),
            ContentKind::Json => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
                serde_json::from_slice(&bytes)
                    .map(Self::Json)
                    .map_err(|e| TransportError::InvalidBody(e.to_string()))
            }
            ContentKind::Text => response
                .text()
                .await
                .map(Self::Text)
                .map_err(|e| TransportError::InvalidBody(e.to_string())),
            ContentKind::Binary => Ok(Self::Binary(response)),
            ContentKind::Unsupported(content_type) => {
                Err(TransportError::UnsupportedContentType(content_type))
            }
        }
    }

    /// Returns a short name of the payload kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Json(_) => "json",
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
        }
    }

    /// Returns true if there is no content.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Decodes a JSON payload into `T`.
    ///
    /// # Errors
    ///
    /// Fails if the payload is not JSON or does not match `T`.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, TransportError> {
        match self {
            Self::Json(value) => {
                serde_json::from_value(value).map_err(|e| TransportError::InvalidBody(e.to_string()))
            }
            other => Err(TransportError::InvalidBody(format!(
                "expected JSON, got {}",
                other.kind()
            ))),
        }
    }

    /// Decodes a JSON payload into `T`, treating no content as `None`.
    ///
    /// # Errors
    ///
    /// Fails if the payload is text or binary, or does not match `T`.
    pub fn into_optional_json<T: DeserializeOwned>(self) -> Result<Option<T>, TransportError> {
        match self {
            Self::Empty => Ok(None),
            other => other.into_json().map(Some),
        }
    }

    /// Returns the payload as text.
    ///
    /// JSON strings are unwrapped; other JSON values are re-serialized.
    ///
    /// # Errors
    ///
    /// Fails for empty and binary payloads.
    pub fn into_text(self) -> Result<String, TransportError> {
        match self {
            Self::Text(text) | Self::Json(Value::String(text)) => Ok(text),
            Self::Json(value) => Ok(value.to_string()),
            other => Err(TransportError::InvalidBody(format!(
                "expected text, got {}",
                other.kind()
            ))),
        }
    }

    /// Reads the whole payload into memory.
    ///
    /// # Errors
    ///
    /// Fails if a binary body cannot be read.
    pub async fn into_bytes(self) -> Result<Vec<u8>, TransportError> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Json(value) => Ok(value.to_string().into_bytes()),
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Binary(response) => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| TransportError::InvalidBody(e.to_string())),
        }
    }

    /// Returns the raw response of a binary payload.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Binary(response) => Some(response),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
