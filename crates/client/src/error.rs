//! Errors raised by the API access layer.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the catalog/checkout service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure; no response was obtained. Recoverable by
    /// the caller, never retried automatically.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The response body did not match the expected shape. Fatal to that
    /// single call.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Non-success HTTP status with a parseable or fallback message.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, or the status text.
        message: String,
    },
}

impl ClientError {
    /// The message to surface to an end-user-facing caller.
    ///
    /// For [`ClientError::Api`] this is the backend's message verbatim;
    /// other variants fall back to their display form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Extract a human-readable message from an error response body.
///
/// Preference order mirrors the backend's error shapes: a structured
/// `detail.message`, then a string `detail`, then a top-level `message`,
/// falling back to the HTTP status text.
pub(crate) fn extract_error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value
            .pointer("/detail/message")
            .and_then(serde_json::Value::as_str)
        {
            return message.to_owned();
        }
        if let Some(detail) = value.get("detail").and_then(serde_json::Value::as_str) {
            return detail.to_owned();
        }
        if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
            return message.to_owned();
        }
    }

    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("request failed")
    )
}
