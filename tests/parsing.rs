//! Unit tests for wire-format serialization and request validation.

use alpaca_fast::{
    AccountStatus, AccountUpdate, AlpacaError, ApiErrorBody, NewOrderRequest, Order, OrderSide,
    OrderStatus, OrderType, TimeInForce, TradingStatus,
};

// ============================================================================
// Enum wire forms
// ============================================================================

#[test]
fn order_side_serializes_correctly() {
    assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"buy\"");
    assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"sell\"");
}

#[test]
fn order_type_serializes_correctly() {
    assert_eq!(
        serde_json::to_string(&OrderType::Market).unwrap(),
        "\"market\""
    );
    assert_eq!(
        serde_json::to_string(&OrderType::StopLimit).unwrap(),
        "\"stop_limit\""
    );
}

#[test]
fn time_in_force_serializes_correctly() {
    assert_eq!(serde_json::to_string(&TimeInForce::Day).unwrap(), "\"day\"");
    assert_eq!(serde_json::to_string(&TimeInForce::Gtc).unwrap(), "\"gtc\"");
    assert_eq!(serde_json::to_string(&TimeInForce::Ioc).unwrap(), "\"ioc\"");
}

#[test]
fn order_status_deserializes_correctly() {
    assert_eq!(
        serde_json::from_str::<OrderStatus>("\"partially_filled\"").unwrap(),
        OrderStatus::PartiallyFilled
    );
    assert_eq!(
        serde_json::from_str::<OrderStatus>("\"done_for_day\"").unwrap(),
        OrderStatus::DoneForDay
    );
}

#[test]
fn account_status_uses_screaming_snake_case() {
    assert_eq!(
        serde_json::from_str::<AccountStatus>("\"ACTIVE\"").unwrap(),
        AccountStatus::Active
    );
    assert_eq!(
        serde_json::from_str::<AccountStatus>("\"SUBMISSION_FAILED\"").unwrap(),
        AccountStatus::SubmissionFailed
    );
}

// ============================================================================
// Order requests
// ============================================================================

#[test]
fn market_order_omits_unset_fields() {
    let order = NewOrderRequest::market("AAPL", 10, OrderSide::Buy);
    let value = serde_json::to_value(&order).unwrap();
    let object = value.as_object().unwrap();

    assert_eq!(object["symbol"], "AAPL");
    assert_eq!(object["qty"], 10);
    assert_eq!(object["type"], "market");
    assert_eq!(object["time_in_force"], "day");
    assert!(!object.contains_key("limit_price"));
    assert!(!object.contains_key("client_order_id"));
}

#[test]
fn stop_limit_order_carries_both_prices() {
    let order = NewOrderRequest::stop_limit("MSFT", 5, OrderSide::Sell, "400.00", "399.50")
        .with_time_in_force(TimeInForce::Gtc);
    let value = serde_json::to_value(&order).unwrap();

    assert_eq!(value["type"], "stop_limit");
    assert_eq!(value["stop_price"], "400.00");
    assert_eq!(value["limit_price"], "399.50");
    assert_eq!(value["time_in_force"], "gtc");
}

#[test]
fn order_serialization_is_idempotent() {
    let order = NewOrderRequest::limit("AAPL", 10, OrderSide::Buy, "180.00")
        .with_client_order_id("abc")
        .with_extended_hours(true);

    let first = serde_json::to_value(&order).unwrap();
    let reparsed: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&first).unwrap()).unwrap();
    assert_eq!(first, reparsed);
}

#[test]
fn order_validation_rejects_bad_requests() {
    let empty_symbol = NewOrderRequest::market("", 10, OrderSide::Buy);
    assert!(matches!(
        empty_symbol.validate(),
        Err(AlpacaError::InvalidRequest(_))
    ));

    let zero_qty = NewOrderRequest::market("AAPL", 0, OrderSide::Buy);
    assert!(zero_qty.validate().is_err());

    let long_id = NewOrderRequest::market("AAPL", 1, OrderSide::Buy)
        .with_client_order_id("x".repeat(49));
    assert!(long_id.validate().is_err());

    let mut limit_without_price = NewOrderRequest::limit("AAPL", 1, OrderSide::Buy, "1.00");
    limit_without_price.limit_price = None;
    assert!(limit_without_price.validate().is_err());

    let valid = NewOrderRequest::limit("AAPL", 1, OrderSide::Buy, "1.00");
    assert!(valid.validate().is_ok());
}

// ============================================================================
// Response models
// ============================================================================

#[test]
fn order_response_parses_renamed_type_field() {
    let json = r#"{
        "id": "61e69015-8549-4bfd-b9c3-01e75843f47d",
        "client_order_id": "my-order-1",
        "symbol": "AAPL",
        "qty": "10",
        "filled_qty": "10",
        "side": "sell",
        "type": "stop_limit",
        "time_in_force": "gtc",
        "stop_price": "400.00",
        "limit_price": "399.50",
        "status": "filled",
        "submitted_at": "2024-03-04T14:32:01Z",
        "filled_at": "2024-03-04T14:35:22Z"
    }"#;

    let order: Order = serde_json::from_str(json).unwrap();
    assert_eq!(order.order_type, OrderType::StopLimit);
    assert_eq!(order.side, OrderSide::Sell);
    assert_eq!(order.status, OrderStatus::Filled);
    assert!(order.filled_at.is_some());
    assert!(!order.extended_hours);
}

#[test]
fn account_update_defaults_missing_currency_to_usd() {
    let json = br#"{
        "id": "904837e3-3b76-47ec-b432-046db621571b",
        "status": "ACTIVE",
        "cash": "4000.32",
        "created_at": "2024-01-02T09:30:00Z",
        "updated_at": "2024-03-04T16:00:00Z"
    }"#;

    let update = AccountUpdate::from_json(json).unwrap();
    assert_eq!(update.currency, "USD");
    assert_eq!(update.status, AccountStatus::Active);
    assert!(update.deleted_at.is_none());
}

#[test]
fn account_update_keeps_explicit_currency() {
    let json = br#"{
        "id": "904837e3-3b76-47ec-b432-046db621571b",
        "status": "ACTIVE",
        "currency": "EUR",
        "cash": "100.00",
        "cash_withdrawable": "50.00",
        "created_at": "2024-01-02T09:30:00Z",
        "updated_at": "2024-03-04T16:00:00Z"
    }"#;

    let update = AccountUpdate::from_json(json).unwrap();
    assert_eq!(update.currency, "EUR");
    assert_eq!(update.withdrawable_cash.as_deref(), Some("50.00"));
}

#[test]
fn trading_status_parses_optional_reasons() {
    let json = r#"{
        "symbol": "AAPL",
        "timestamp": "2024-03-04T14:32:00Z",
        "status_code": "H",
        "status_message": "Trading Halt",
        "tape": "C"
    }"#;

    let status: TradingStatus = serde_json::from_str(json).unwrap();
    assert_eq!(status.status_code, "H");
    assert!(status.reason_code.is_none());
}

#[test]
fn api_error_body_tolerates_partial_payloads() {
    let full: ApiErrorBody =
        serde_json::from_str(r#"{"code": 40010001, "message": "qty must be > 0"}"#).unwrap();
    assert_eq!(full.code, Some(40010001));

    let message_only: ApiErrorBody = serde_json::from_str(r#"{"message": "oops"}"#).unwrap();
    assert_eq!(message_only.code, None);

    let empty: ApiErrorBody = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, ApiErrorBody { code: None, message: None });
}
