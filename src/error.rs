use reqwest::StatusCode;
use thiserror::Error;

use crate::types::ApiErrorBody;

/// Errors surfaced by the REST client and its dispatch core.
///
/// Every failure is surfaced to the caller on first occurrence; the only
/// internally handled condition is a throttle-rejected response, which the
/// dispatch loop discards and retries within its attempt budget.
#[derive(Debug, Error)]
pub enum AlpacaError {
    /// The caller's cancellation token fired (directly or via a deadline).
    #[error("request cancelled")]
    Cancelled,

    /// Connection-level failure during send or body read. Never retried by
    /// the dispatch loop; retry-after-transport-failure belongs to callers.
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The throttler never approved a response within its attempt budget.
    #[error("unable to successfully call `{endpoint}` after {attempts} attempts")]
    RetryExhausted { endpoint: String, attempts: usize },

    /// A success response carried a body that did not match the expected shape.
    #[error("failed to parse response body: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// The service signaled a business-level failure on an otherwise
    /// transport-successful response.
    #[error("API error (HTTP {status}): {}", api_message(.error, .raw_body))]
    Api {
        status: StatusCode,
        /// Structured `{code, message}` payload, when the body parsed as one.
        error: Option<ApiErrorBody>,
        raw_body: String,
    },

    /// The endpoint reference could not be resolved against the base origin.
    #[error("invalid endpoint address: {0}")]
    InvalidAddress(#[from] url::ParseError),

    /// Request-side validation failed before any I/O.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A header name or value could not be constructed.
    #[error("invalid header value: {0}")]
    Header(String),
}

fn api_message<'a>(error: &'a Option<ApiErrorBody>, raw_body: &'a str) -> &'a str {
    error
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .unwrap_or(raw_body)
}
