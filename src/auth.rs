use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::AlpacaError;

/// Credentials for the trading API.
///
/// The client treats authentication as opaque header injection: whichever
/// variant is configured, [`authentication_headers`](Self::authentication_headers)
/// yields the name/value pairs to attach, computed once when the client
/// session is built.
#[derive(Clone)]
pub enum AlpacaAuth {
    /// Key-pair credentials sent as `APCA-API-KEY-ID` / `APCA-API-SECRET-KEY`.
    ApiKey { key_id: String, secret_key: String },
    /// OAuth access token sent as `Authorization: Bearer <token>`.
    OAuth { token: String },
}

impl AlpacaAuth {
    pub fn api_key(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self::ApiKey {
            key_id: key_id.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn oauth(token: impl Into<String>) -> Self {
        Self::OAuth {
            token: token.into(),
        }
    }

    /// Header name/value pairs for this credential set.
    pub fn authentication_headers(&self) -> Result<HeaderMap, AlpacaError> {
        let mut headers = HeaderMap::new();
        match self {
            Self::ApiKey { key_id, secret_key } => {
                headers.insert(
                    HeaderName::from_static("apca-api-key-id"),
                    header_value(key_id)?,
                );
                let mut secret = header_value(secret_key)?;
                secret.set_sensitive(true);
                headers.insert(HeaderName::from_static("apca-api-secret-key"), secret);
            }
            Self::OAuth { token } => {
                let mut value = header_value(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, AlpacaError> {
    HeaderValue::from_str(value).map_err(|e| AlpacaError::Header(e.to_string()))
}

impl fmt::Debug for AlpacaAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey { key_id, .. } => f
                .debug_struct("ApiKey")
                .field("key_id", key_id)
                .field("secret_key", &"<redacted>")
                .finish(),
            Self::OAuth { .. } => f
                .debug_struct("OAuth")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AlpacaAuth;

    #[test]
    fn api_key_headers_contain_both_pairs() {
        let auth = AlpacaAuth::api_key("key-id", "secret");
        let headers = auth.authentication_headers().unwrap();
        assert_eq!(headers.get("apca-api-key-id").unwrap(), "key-id");
        assert_eq!(headers.get("apca-api-secret-key").unwrap(), "secret");
    }

    #[test]
    fn oauth_headers_use_bearer_scheme() {
        let auth = AlpacaAuth::oauth("tok123");
        let headers = auth.authentication_headers().unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer tok123");
    }

    #[test]
    fn debug_redacts_secrets() {
        let auth = AlpacaAuth::api_key("key-id", "super-secret");
        let debug = format!("{auth:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("super-secret"));
    }
}
