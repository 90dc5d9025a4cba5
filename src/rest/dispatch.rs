//! The throttled dispatch loop: one logical call, bounded send attempts.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Request, Response};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::AlpacaError;
use crate::throttle::{NOOP_THROTTLER, Throttler};

/// Transport-ready request: method, resolved address, header set, and an
/// optional serialized body.
///
/// Immutable once built; [`send_throttled`] materializes a fresh transport
/// request from the same envelope for every attempt, so retries never reuse
/// a consumed request object.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl RequestEnvelope {
    /// Resolves `endpoint` (relative or absolute) against `base`. Fails with
    /// [`AlpacaError::InvalidAddress`] before any I/O occurs.
    pub fn new(method: Method, base: &Url, endpoint: &str) -> Result<Self, AlpacaError> {
        let url = base.join(endpoint)?;
        Ok(Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// Serializes `content` as the JSON body and sets the content type.
    pub fn with_json<B>(mut self, content: &B) -> Result<Self, AlpacaError>
    where
        B: Serialize + ?Sized,
    {
        self.body = Some(serde_json::to_vec(content)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Encodes `query` into the envelope's address.
    pub fn with_query<Q>(mut self, query: &Q) -> Result<Self, AlpacaError>
    where
        Q: Serialize + ?Sized,
    {
        let encoded = serde_urlencoded::to_string(query)
            .map_err(|e| AlpacaError::InvalidRequest(e.to_string()))?;
        if !encoded.is_empty() {
            self.url.set_query(Some(&encoded));
        }
        Ok(self)
    }

    /// Attaches opaque headers (authentication, content negotiation).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn to_request(&self, http: &Client) -> Result<Request, AlpacaError> {
        let mut builder = http
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        Ok(builder.build()?)
    }
}

/// Executes one logical HTTP call with bounded retries.
///
/// The loop consults `throttler` before each send and after each response:
/// a response the throttler approves is returned as-is (its body unread, so
/// large payloads never delay the throttle check); a rejected response is
/// dropped, which releases its pooled connection, before the next attempt
/// starts. At most one response is alive per logical call.
///
/// Transport-level failures propagate immediately without consuming further
/// attempts; the retry budget is reserved for policy-level throttling
/// signals. Cancellation at any suspension point yields
/// [`AlpacaError::Cancelled`], never [`AlpacaError::RetryExhausted`].
pub async fn send_throttled(
    http: &Client,
    envelope: &RequestEnvelope,
    cancel: &CancellationToken,
    throttler: Option<&dyn Throttler>,
) -> Result<Response, AlpacaError> {
    let throttler: &dyn Throttler = throttler.unwrap_or(&NOOP_THROTTLER);
    let attempts = throttler.max_retry_attempts();

    for attempt in 0..attempts {
        if cancel.is_cancelled() {
            return Err(AlpacaError::Cancelled);
        }
        throttler.wait_to_proceed(cancel).await?;

        let request = envelope.to_request(http)?;
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AlpacaError::Cancelled),
            result = http.execute(request) => result.map_err(AlpacaError::Transport)?,
        };

        if throttler.check_response(&response) {
            return Ok(response);
        }

        tracing::debug!(
            url = %envelope.url,
            status = %response.status(),
            attempt,
            "response rejected by throttler, retrying"
        );
        drop(response);
    }

    tracing::warn!(url = %envelope.url, attempts, "retry budget exhausted");
    Err(AlpacaError::RetryExhausted {
        endpoint: envelope.url.to_string(),
        attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_endpoint_resolves_against_base() {
        let base = Url::parse("https://api.example.com").unwrap();
        let envelope = RequestEnvelope::new(Method::GET, &base, "/v2/account").unwrap();
        assert_eq!(envelope.url().as_str(), "https://api.example.com/v2/account");
    }

    #[test]
    fn absolute_endpoint_overrides_base() {
        let base = Url::parse("https://api.example.com").unwrap();
        let envelope =
            RequestEnvelope::new(Method::GET, &base, "https://other.example.com/v1/x").unwrap();
        assert_eq!(envelope.url().host_str(), Some("other.example.com"));
    }

    #[test]
    fn malformed_endpoint_fails_fast() {
        let base = Url::parse("https://api.example.com").unwrap();
        let result = RequestEnvelope::new(Method::GET, &base, "https://[invalid");
        assert!(matches!(result, Err(AlpacaError::InvalidAddress(_))));
    }

    #[test]
    fn json_body_sets_content_type() {
        let base = Url::parse("https://api.example.com").unwrap();
        let envelope = RequestEnvelope::new(Method::POST, &base, "/v2/orders")
            .unwrap()
            .with_json(&serde_json::json!({"symbol": "AAPL"}))
            .unwrap();
        assert_eq!(
            envelope.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(envelope.body.is_some());
    }

    #[test]
    fn query_is_encoded_into_url() {
        #[derive(Serialize)]
        struct Query {
            limit: u32,
            status: &'static str,
        }

        let base = Url::parse("https://api.example.com").unwrap();
        let envelope = RequestEnvelope::new(Method::GET, &base, "/v2/orders")
            .unwrap()
            .with_query(&Query {
                limit: 50,
                status: "open",
            })
            .unwrap();
        assert_eq!(envelope.url().query(), Some("limit=50&status=open"));
    }
}
