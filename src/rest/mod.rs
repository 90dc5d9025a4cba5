pub mod client;
pub mod dispatch;
pub mod response;
pub mod types;

pub use client::{AlpacaRestClient, AlpacaRestClientBuilder};
pub use dispatch::{RequestEnvelope, send_throttled};
