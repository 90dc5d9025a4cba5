//! Interprets finalized responses: typed deserialization or a success flag.

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::AlpacaError;
use crate::types::ApiErrorBody;

/// Reads the body and parses it into `T`.
///
/// A non-success status yields [`AlpacaError::Api`] carrying the service's
/// structured `{code, message}` payload when the body parses as one, the
/// raw body otherwise. A success status with an unparseable body yields
/// [`AlpacaError::Deserialize`]. Empty success bodies read as `{}` so
/// endpoints returning no content deserialize into unit-like types.
pub async fn deserialize<T>(response: Response) -> Result<T, AlpacaError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        let body = if bytes.is_empty() {
            b"{}".as_slice()
        } else {
            bytes.as_ref()
        };
        return Ok(serde_json::from_slice(body)?);
    }

    Err(build_api_error(status, &bytes))
}

/// Parses the body as wire shape `W`, then converts into the public type `T`.
///
/// Use this when the service's JSON shape needs normalization before it is
/// handed to callers (see [`crate::stream::AccountUpdateWire`]).
pub async fn deserialize_as<T, W>(response: Response) -> Result<T, AlpacaError>
where
    W: DeserializeOwned + Into<T>,
{
    Ok(deserialize::<W>(response).await?.into())
}

/// Classifies purely by status-code success range; never errors.
pub fn is_success(response: &Response) -> bool {
    response.status().is_success()
}

fn build_api_error(status: StatusCode, bytes: &[u8]) -> AlpacaError {
    let raw_body = String::from_utf8_lossy(bytes).into_owned();
    let error = serde_json::from_slice::<ApiErrorBody>(bytes)
        .ok()
        .filter(|e| e.code.is_some() || e.message.is_some());
    AlpacaError::Api {
        status,
        error,
        raw_body,
    }
}
