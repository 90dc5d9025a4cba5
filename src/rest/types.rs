use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AlpacaError;
use crate::types::{AccountStatus, OrderSide, OrderStatus, OrderType, TimeInForce};

const MAX_CLIENT_ORDER_ID_LEN: usize = 48;
const MAX_ORDERS_PAGE_LIMIT: u32 = 500;

/// Trading account state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Account {
    pub id: String,
    pub account_number: String,
    pub status: AccountStatus,
    pub currency: String,
    pub cash: String,
    pub buying_power: String,
    #[serde(default)]
    pub portfolio_value: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub pattern_day_trader: bool,
    #[serde(default)]
    pub trading_blocked: bool,
    #[serde(default)]
    pub account_blocked: bool,
}

/// Market clock.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Clock {
    pub timestamp: DateTime<Utc>,
    pub is_open: bool,
    pub next_open: DateTime<Utc>,
    pub next_close: DateTime<Utc>,
}

/// A single order, resting or historical.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_order_id: String,
    pub symbol: String,
    pub qty: String,
    pub filled_qty: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub limit_price: Option<String>,
    #[serde(default)]
    pub stop_price: Option<String>,
    pub status: OrderStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub filled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extended_hours: bool,
}

/// An open position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub qty: String,
    pub side: String,
    pub avg_entry_price: String,
    #[serde(default)]
    pub market_value: Option<String>,
    #[serde(default)]
    pub unrealized_pl: Option<String>,
}

/// Lifecycle filter for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusFilter {
    Open,
    Closed,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Query parameters for [`list_orders`](crate::rest::AlpacaRestClient::list_orders).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListOrdersParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatusFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<SortDirection>,
    /// Comma-separated symbol filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<String>,
}

impl ListOrdersParams {
    pub fn validate(&self) -> Result<(), AlpacaError> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_ORDERS_PAGE_LIMIT {
                return Err(AlpacaError::InvalidRequest(format!(
                    "limit must be between 1 and {MAX_ORDERS_PAGE_LIMIT}"
                )));
            }
        }
        Ok(())
    }
}

/// Order placement request.
///
/// Build with one of the typed constructors ([`market`](Self::market),
/// [`limit`](Self::limit), [`stop`](Self::stop), [`stop_limit`](Self::stop_limit))
/// and chain the `with_*` setters. [`validate`](Self::validate) runs before
/// any I/O when the request is submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderRequest {
    pub symbol: String,
    pub qty: i64,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_hours: Option<bool>,
}

impl NewOrderRequest {
    fn base(symbol: impl Into<String>, qty: i64, side: OrderSide, order_type: OrderType) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            side,
            order_type,
            time_in_force: TimeInForce::Day,
            limit_price: None,
            stop_price: None,
            client_order_id: None,
            extended_hours: None,
        }
    }

    pub fn market(symbol: impl Into<String>, qty: i64, side: OrderSide) -> Self {
        Self::base(symbol, qty, side, OrderType::Market)
    }

    pub fn limit(
        symbol: impl Into<String>,
        qty: i64,
        side: OrderSide,
        limit_price: impl Into<String>,
    ) -> Self {
        let mut order = Self::base(symbol, qty, side, OrderType::Limit);
        order.limit_price = Some(limit_price.into());
        order
    }

    pub fn stop(
        symbol: impl Into<String>,
        qty: i64,
        side: OrderSide,
        stop_price: impl Into<String>,
    ) -> Self {
        let mut order = Self::base(symbol, qty, side, OrderType::Stop);
        order.stop_price = Some(stop_price.into());
        order
    }

    pub fn stop_limit(
        symbol: impl Into<String>,
        qty: i64,
        side: OrderSide,
        stop_price: impl Into<String>,
        limit_price: impl Into<String>,
    ) -> Self {
        let mut order = Self::base(symbol, qty, side, OrderType::StopLimit);
        order.stop_price = Some(stop_price.into());
        order.limit_price = Some(limit_price.into());
        order
    }

    pub fn with_time_in_force(mut self, time_in_force: TimeInForce) -> Self {
        self.time_in_force = time_in_force;
        self
    }

    pub fn with_client_order_id(mut self, client_order_id: impl Into<String>) -> Self {
        self.client_order_id = Some(client_order_id.into());
        self
    }

    pub fn with_extended_hours(mut self, extended_hours: bool) -> Self {
        self.extended_hours = Some(extended_hours);
        self
    }

    pub fn validate(&self) -> Result<(), AlpacaError> {
        if self.symbol.is_empty() {
            return Err(AlpacaError::InvalidRequest(
                "symbol must not be empty".to_owned(),
            ));
        }
        if self.qty <= 0 {
            return Err(AlpacaError::InvalidRequest(
                "order quantity must be positive".to_owned(),
            ));
        }
        if let Some(id) = &self.client_order_id {
            if id.len() > MAX_CLIENT_ORDER_ID_LEN {
                return Err(AlpacaError::InvalidRequest(format!(
                    "client order id must be at most {MAX_CLIENT_ORDER_ID_LEN} characters"
                )));
            }
        }
        match self.order_type {
            OrderType::Limit if self.limit_price.is_none() => Err(AlpacaError::InvalidRequest(
                "limit orders require a limit price".to_owned(),
            )),
            OrderType::Stop if self.stop_price.is_none() => Err(AlpacaError::InvalidRequest(
                "stop orders require a stop price".to_owned(),
            )),
            OrderType::StopLimit if self.limit_price.is_none() || self.stop_price.is_none() => {
                Err(AlpacaError::InvalidRequest(
                    "stop-limit orders require both a stop and a limit price".to_owned(),
                ))
            }
            _ => Ok(()),
        }
    }
}
