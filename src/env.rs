use url::Url;

/// Path prefix for the trading API. Endpoint paths must begin with `/`,
/// e.g. `/orders` becomes `/v2/orders`.
pub const TRADING_API_PREFIX: &str = "/v2";

/// Target environment for REST calls: live trading or the paper sandbox.
#[derive(Debug, Clone)]
pub struct AlpacaEnvironment {
    pub trading_origin: Url,
    pub data_origin: Url,
}

impl AlpacaEnvironment {
    /// Live trading environment (real money).
    pub fn live() -> Self {
        Self {
            trading_origin: Url::parse("https://api.alpaca.markets")
                .expect("static origin URL is valid"),
            data_origin: Url::parse("https://data.alpaca.markets")
                .expect("static origin URL is valid"),
        }
    }

    /// Paper trading environment.
    pub fn paper() -> Self {
        Self {
            trading_origin: Url::parse("https://paper-api.alpaca.markets")
                .expect("static origin URL is valid"),
            data_origin: Url::parse("https://data.alpaca.markets")
                .expect("static origin URL is valid"),
        }
    }

    /// Custom origins, mainly useful for tests and proxies.
    pub fn custom(trading_origin: Url, data_origin: Url) -> Self {
        Self {
            trading_origin,
            data_origin,
        }
    }
}
