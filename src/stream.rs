//! Typed payloads for the account-events and trading-status streams.
//!
//! Only the message shapes live here; transporting them (SSE or WebSocket)
//! is up to the caller. Wire shapes that need normalization get a separate
//! `*Wire` struct plus an infallible conversion into the public type.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AlpacaError;
use crate::types::AccountStatus;

/// Account update event.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub account_id: String,
    pub status: AccountStatus,
    /// Defaults to `"USD"` when the service omits it.
    pub currency: String,
    pub tradable_cash: String,
    pub withdrawable_cash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl AccountUpdate {
    pub fn from_json(bytes: &[u8]) -> Result<Self, AlpacaError> {
        Ok(serde_json::from_slice::<AccountUpdateWire>(bytes)?.into())
    }
}

/// Raw account update as sent by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountUpdateWire {
    pub id: String,
    pub status: AccountStatus,
    #[serde(default)]
    pub currency: Option<String>,
    pub cash: String,
    #[serde(default)]
    pub cash_withdrawable: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<AccountUpdateWire> for AccountUpdate {
    fn from(wire: AccountUpdateWire) -> Self {
        Self {
            account_id: wire.id,
            status: wire.status,
            currency: wire
                .currency
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "USD".to_owned()),
            tradable_cash: wire.cash,
            withdrawable_cash: wire.cash_withdrawable,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            deleted_at: wire.deleted_at,
        }
    }
}

/// Trading status update for one symbol.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradingStatus {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub status_code: String,
    #[serde(default)]
    pub status_message: Option<String>,
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub reason_message: Option<String>,
    pub tape: String,
}
