use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Proxy};
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::AlpacaAuth;
use crate::env::{AlpacaEnvironment, TRADING_API_PREFIX};
use crate::error::AlpacaError;
use crate::rest::dispatch::{RequestEnvelope, send_throttled};
use crate::rest::response;
use crate::rest::types::*;
use crate::throttle::Throttler;

const USER_AGENT: &str = concat!("alpaca-fast/", env!("CARGO_PKG_VERSION"));

/// Builder for [`AlpacaRestClient`] with transport, throttling, and
/// cancellation customization.
#[derive(Clone, Default)]
pub struct AlpacaRestClientBuilder {
    env: Option<AlpacaEnvironment>,
    auth: Option<AlpacaAuth>,
    throttler: Option<Arc<dyn Throttler>>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    default_headers: Option<HeaderMap>,
    proxy: Option<Proxy>,
    http_client: Option<Client>,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for AlpacaRestClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaRestClientBuilder")
            .field("env", &self.env)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl AlpacaRestClientBuilder {
    fn new(env: AlpacaEnvironment) -> Self {
        Self {
            env: Some(env),
            ..Self::default()
        }
    }

    pub fn with_auth(mut self, auth: AlpacaAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Installs the throttling policy consulted by every dispatch.
    pub fn with_throttler(mut self, throttler: Arc<dyn Throttler>) -> Self {
        self.throttler = Some(throttler);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn with_proxy(mut self, proxy: Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Uses a preconfigured transport instead of building one. Timeout,
    /// connect-timeout, and proxy settings on this builder are ignored in
    /// that case.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Threads an external cancellation token through every call made by the
    /// built client. Deadlines are expressed by cancelling this token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<AlpacaRestClient, AlpacaError> {
        let env = self.env.unwrap_or_else(AlpacaEnvironment::paper);

        let http = if let Some(client) = self.http_client {
            client
        } else {
            let mut builder = Client::builder().user_agent(USER_AGENT);
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(proxy) = self.proxy {
                builder = builder.proxy(proxy);
            }
            builder.build()?
        };

        // Session headers are computed once here and attached to every
        // envelope, so they also apply when a caller supplies its own
        // transport.
        let mut session_headers = self.default_headers.unwrap_or_default();
        session_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(auth) = &self.auth {
            session_headers.extend(auth.authentication_headers()?);
        }

        Ok(AlpacaRestClient {
            http,
            trading_origin: env.trading_origin,
            session_headers,
            throttler: self.throttler,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// Async HTTP client for the trading REST API.
///
/// Every call flows through the throttled dispatch core: the configured
/// [`Throttler`] gates each send attempt and classifies each response as
/// final or retryable within a bounded attempt budget.
///
/// # Construction
///
/// ```no_run
/// use alpaca_fast::{AlpacaAuth, AlpacaEnvironment, AlpacaRestClient};
///
/// # fn run() -> Result<(), alpaca_fast::AlpacaError> {
/// let client = AlpacaRestClient::builder(AlpacaEnvironment::paper())
///     .with_auth(AlpacaAuth::api_key("key-id", "secret-key"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AlpacaRestClient {
    http: Client,
    trading_origin: Url,
    session_headers: HeaderMap,
    throttler: Option<Arc<dyn Throttler>>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for AlpacaRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaRestClient")
            .field("trading_origin", &self.trading_origin)
            .finish_non_exhaustive()
    }
}

impl AlpacaRestClient {
    /// Start a configurable client builder.
    pub fn builder(env: AlpacaEnvironment) -> AlpacaRestClientBuilder {
        AlpacaRestClientBuilder::new(env)
    }

    /// Create an unauthenticated, unthrottled client for the given
    /// environment. Chain [`builder`](Self::builder) options as needed.
    pub fn new(env: AlpacaEnvironment) -> Result<Self, AlpacaError> {
        Self::builder(env).build()
    }

    fn full_path(endpoint_path: &str) -> String {
        // endpoint_path must begin with "/", e.g. "/orders"
        format!("{TRADING_API_PREFIX}{endpoint_path}")
    }

    fn envelope(&self, method: Method, path: &str) -> Result<RequestEnvelope, AlpacaError> {
        Ok(RequestEnvelope::new(method, &self.trading_origin, path)?
            .with_headers(self.session_headers.clone()))
    }

    async fn send<T>(&self, envelope: RequestEnvelope) -> Result<T, AlpacaError>
    where
        T: DeserializeOwned,
    {
        let resp = send_throttled(
            &self.http,
            &envelope,
            &self.cancel,
            self.throttler.as_deref(),
        )
        .await?;
        response::deserialize(resp).await
    }

    async fn send_expect_success(&self, envelope: RequestEnvelope) -> Result<bool, AlpacaError> {
        let resp = send_throttled(
            &self.http,
            &envelope,
            &self.cancel,
            self.throttler.as_deref(),
        )
        .await?;
        Ok(response::is_success(&resp))
    }

    // -----------------------------------------------
    // Account
    // -----------------------------------------------

    /// Get the trading account.
    pub async fn get_account(&self) -> Result<Account, AlpacaError> {
        let path = Self::full_path("/account");
        self.send(self.envelope(Method::GET, &path)?).await
    }

    // -----------------------------------------------
    // Clock
    // -----------------------------------------------

    /// Get the current market clock.
    pub async fn get_clock(&self) -> Result<Clock, AlpacaError> {
        let path = Self::full_path("/clock");
        self.send(self.envelope(Method::GET, &path)?).await
    }

    // -----------------------------------------------
    // Orders
    // -----------------------------------------------

    /// List orders with optional filters.
    pub async fn list_orders(&self, params: ListOrdersParams) -> Result<Vec<Order>, AlpacaError> {
        params.validate()?;
        let path = Self::full_path("/orders");
        self.send(self.envelope(Method::GET, &path)?.with_query(&params)?)
            .await
    }

    /// Get a single order by ID.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, AlpacaError> {
        let path = Self::full_path(&format!("/orders/{order_id}"));
        self.send(self.envelope(Method::GET, &path)?).await
    }

    /// Place a new order. The request is validated before any I/O.
    pub async fn place_order(&self, order: NewOrderRequest) -> Result<Order, AlpacaError> {
        order.validate()?;
        let path = Self::full_path("/orders");
        self.send(self.envelope(Method::POST, &path)?.with_json(&order)?)
            .await
    }

    /// Cancel an order by ID. Returns whether the service accepted the
    /// cancellation; non-success statuses report `false` rather than failing.
    pub async fn cancel_order(&self, order_id: &str) -> Result<bool, AlpacaError> {
        let path = Self::full_path(&format!("/orders/{order_id}"));
        self.send_expect_success(self.envelope(Method::DELETE, &path)?)
            .await
    }

    // -----------------------------------------------
    // Positions
    // -----------------------------------------------

    /// List all open positions.
    pub async fn list_positions(&self) -> Result<Vec<Position>, AlpacaError> {
        let path = Self::full_path("/positions");
        self.send(self.envelope(Method::GET, &path)?).await
    }
}
