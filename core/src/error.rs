//! Error types for the Strapi client.
//!
//! # Design
//! Two origins matter to callers. `Transport` means no response was obtained
//! and is reported as status 500 / `UnknownError`. `HttpError` means the
//! server answered with a non-2xx status; its JSON body is kept exactly as
//! received so callers can match on Strapi's own error vocabulary. The
//! remaining variants are local failures (payload encoding, URL building)
//! and report the same normalized 500 / `UnknownError` shape.

use serde_json::Value;
use thiserror::Error;

use crate::http::TransportError;
use crate::types::{ErrorDetail, ErrorEnvelope};

pub const UNKNOWN_ERROR: &str = "UnknownError";

/// Errors returned by `StrapiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The HTTP exchange failed before a response was received.
    #[error("UnknownError: {0}")]
    Transport(#[from] TransportError),

    /// The server returned a non-2xx status. `body` is the decoded JSON
    /// body, or a JSON string holding the raw text when it was not JSON.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: Value },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A success body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A content type, id or provider that cannot stand as one path segment.
    #[error("invalid path segment: `{0}`")]
    InvalidPathSegment(String),

    /// Provider authentication was attempted without an access token.
    #[error("no access token available for provider `{provider}`")]
    MissingAccessToken { provider: String },
}

impl ApiError {
    /// Server error body, untouched. `None` for every non-server error.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::HttpError { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Status in the normalized error shape.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::HttpError { status, body } => body
                .pointer("/error/status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok())
                .unwrap_or(*status),
            _ => 500,
        }
    }

    /// Error name in the normalized error shape (`ValidationError`,
    /// `UnauthorizedError`, ... for server errors).
    pub fn name(&self) -> &str {
        match self {
            ApiError::HttpError { body, .. } => body
                .pointer("/error/name")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR),
            _ => UNKNOWN_ERROR,
        }
    }

    /// The `{ error: { status, name, message, details } }` view of this error.
    ///
    /// Server bodies that already follow the envelope are returned as-is.
    pub fn envelope(&self) -> ErrorEnvelope {
        if let ApiError::HttpError { body, .. } = self {
            if let Ok(envelope) = serde_json::from_value::<ErrorEnvelope>(body.clone()) {
                return envelope;
            }
        }

        let (message, details) = match self {
            ApiError::Transport(err) => (err.message().to_string(), Value::String(format!("{err:?}"))),
            ApiError::HttpError { body, .. } => (self.to_string(), body.clone()),
            other => (other.to_string(), Value::Object(Default::default())),
        };

        ErrorEnvelope {
            data: None,
            error: ErrorDetail {
                status: self.status(),
                name: self.name().to_string(),
                message,
                details,
            },
        }
    }
}
