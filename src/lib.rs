//! # alpaca-fast
//!
//! Async Rust client for the [Alpaca](https://alpaca.markets) trading API.
//!
//! ## Features
//!
//! - **Throttled dispatch core** — every REST call runs through a bounded
//!   retry loop gated by a pluggable [`Throttler`]; rate limits and
//!   `429 Retry-After` hints are honored without caller involvement
//! - **First-class cancellation** — a `CancellationToken` threads through
//!   every suspension point; deadlines are just cancelled tokens
//! - **Typed models** — orders, account, clock, positions, and streaming
//!   update payloads, with request validation before any I/O
//! - **Transport builder** — timeout/connect-timeout/headers/proxy/custom
//!   client
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use alpaca_fast::{
//!     AlpacaAuth, AlpacaEnvironment, AlpacaRestClient, NewOrderRequest, OrderSide,
//!     RateThrottler, ThrottleConfig,
//! };
//!
//! # async fn run() -> Result<(), alpaca_fast::AlpacaError> {
//! let client = AlpacaRestClient::builder(AlpacaEnvironment::paper())
//!     .with_auth(AlpacaAuth::api_key("key-id", "secret-key"))
//!     .with_throttler(Arc::new(RateThrottler::new(ThrottleConfig::default())))
//!     .build()?;
//!
//! let clock = client.get_clock().await?;
//! if clock.is_open {
//!     let order = client
//!         .place_order(NewOrderRequest::limit("AAPL", 10, OrderSide::Buy, "180.00"))
//!         .await?;
//!     println!("order {} is {:?}", order.id, order.status);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Throttling and retries
//!
//! A [`Throttler`] makes two decisions per attempt: whether the caller may
//! send now (`wait_to_proceed`), and whether a completed response is final
//! or should be discarded and retried (`check_response`). [`RateThrottler`]
//! enforces a requests-per-second budget shared across concurrent calls and
//! records server-advised `Retry-After` waits. With no throttler configured,
//! a no-op policy sends exactly once and accepts any response.
//!
//! Transport-level failures (connection errors) are **not** retried by the
//! dispatch loop; the retry budget is reserved for policy-level throttling
//! signals. Layer transport retries above the client if you need them.
//!
//! ## Cancellation
//!
//! ```no_run
//! use tokio_util::sync::CancellationToken;
//! use alpaca_fast::{AlpacaEnvironment, AlpacaRestClient};
//!
//! # fn run() -> Result<(), alpaca_fast::AlpacaError> {
//! let cancel = CancellationToken::new();
//! let client = AlpacaRestClient::builder(AlpacaEnvironment::paper())
//!     .with_cancellation(cancel.clone())
//!     .build()?;
//! // cancel.cancel() aborts in-flight and future calls with AlpacaError::Cancelled.
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod env;
pub mod error;
pub mod rest;
pub mod stream;
pub mod throttle;
pub mod types;

pub use auth::AlpacaAuth;
pub use env::{AlpacaEnvironment, TRADING_API_PREFIX};
pub use error::AlpacaError;
pub use rest::{AlpacaRestClient, AlpacaRestClientBuilder, RequestEnvelope, send_throttled};
pub use throttle::{NoopThrottler, RateThrottler, ThrottleConfig, Throttler};

pub use rest::types::*;
pub use stream::{AccountUpdate, AccountUpdateWire, TradingStatus};
pub use types::*;
