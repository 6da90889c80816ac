//! Uniform error for every backend call.

use std::fmt;

use helper_core::error::HelperError;

/// Category of a failed backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// Connection refused, DNS failure, reset, or any other transport fault.
    Transport,
    /// The backend answered with a non-success HTTP status.
    Status(u16),
    /// The backend answered, but the payload did not match the contract.
    Decode,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Status(code) => write!(f, "status {}", code),
            ApiErrorKind::Decode => write!(f, "decode"),
        }
    }
}

/// Longest slice of a raw error body kept in a message, in characters.
pub const MAX_BODY_CHARS: usize = 200;

/// A failed backend call.
///
/// Displays as the bare human-readable message so callers can show it to
/// the user as is; the kind is available for branching.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Status(code), message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    /// Build the error for a non-success response.
    ///
    /// Uses the backend's `{"detail": "..."}` body when present, otherwise
    /// the status code with the raw body (cut to `MAX_BODY_CHARS`) or the
    /// canonical reason.
    pub fn from_status_body(code: u16, body: &str) -> Self {
        if let Some(detail) = detail_message(body) {
            return Self::status(code, detail);
        }
        let body = body.trim();
        let text = if body.is_empty() {
            reqwest::StatusCode::from_u16(code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        } else {
            truncate_body(body)
        };
        Self::status(code, format!("HTTP {}: {}", code, text))
    }
}

/// Extract a string `detail` field from a FastAPI error body.
fn detail_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(|d| d.as_str())
        .map(str::to_string)
}

fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Render an error followed by each of its sources, `outer: inner: root`.
///
/// Causes already spelled out by an outer message are skipped.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_decode() {
            ApiError::decode(message)
        } else if let Some(status) = err.status() {
            ApiError::status(status.as_u16(), message)
        } else {
            ApiError::transport(message)
        }
    }
}

impl From<ApiError> for HelperError {
    fn from(err: ApiError) -> Self {
        HelperError::Api(err.message)
    }
}
