//! Admission control and retry classification for REST dispatch.
//!
//! A [`Throttler`] decides when a request may be sent and whether a completed
//! response is final or should be discarded and retried. The dispatch loop in
//! [`crate::rest::dispatch`] consults it before every send attempt and after
//! every response.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::AlpacaError;

/// Admission-control and response-classification policy for one client.
///
/// Implementations may keep shared state across concurrent logical calls
/// (e.g. a global rate budget); the dispatch loop itself keeps no cross-call
/// memory.
#[async_trait]
pub trait Throttler: Send + Sync {
    /// Upper bound on send attempts for one logical call.
    fn max_retry_attempts(&self) -> usize;

    /// Suspends until the caller may send, or fails with
    /// [`AlpacaError::Cancelled`] when the token fires first.
    async fn wait_to_proceed(&self, cancel: &CancellationToken) -> Result<(), AlpacaError>;

    /// Inspects a completed response. `true` means the response is final and
    /// should be returned to the caller; `false` means the dispatch loop
    /// should discard it and retry. Implementations may record server-advised
    /// wait hints here for the next `wait_to_proceed`.
    fn check_response(&self, response: &Response) -> bool;
}

/// Pass-through policy: a single attempt, no admission delay, and every
/// response is final. Used by the dispatch loop when no throttler is
/// configured, so the loop body has no special case.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopThrottler;

pub(crate) static NOOP_THROTTLER: NoopThrottler = NoopThrottler;

#[async_trait]
impl Throttler for NoopThrottler {
    fn max_retry_attempts(&self) -> usize {
        1
    }

    async fn wait_to_proceed(&self, _cancel: &CancellationToken) -> Result<(), AlpacaError> {
        Ok(())
    }

    fn check_response(&self, _response: &Response) -> bool {
        true
    }
}

/// Configuration for [`RateThrottler`].
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Maximum requests per second admitted across all concurrent calls
    /// sharing this throttler (0 = unlimited).
    pub requests_per_second: u32,
    /// Send-attempt budget per logical call.
    pub max_retry_attempts: usize,
    /// Statuses treated as retryable throttling signals rather than final
    /// responses.
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 3,
            max_retry_attempts: 5,
            retry_statuses: vec![
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::SERVICE_UNAVAILABLE,
            ],
        }
    }
}

/// Request-rate throttler with server-advised wait support.
///
/// Admission uses a monotonic next-slot schedule guarded by a mutex: each
/// admitted caller claims the later of `last slot + interval` and now, so
/// concurrent calls are spaced at the configured rate. `Retry-After` headers
/// on rejected responses push the next slot further out.
#[derive(Debug)]
pub struct RateThrottler {
    config: ThrottleConfig,
    interval: Duration,
    next_slot: Mutex<Instant>,
    server_hint: Mutex<Option<Instant>>,
}

impl RateThrottler {
    pub fn new(config: ThrottleConfig) -> Self {
        let interval = if config.requests_per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(1.0 / f64::from(config.requests_per_second))
        };
        let now = Instant::now();
        Self {
            config,
            interval,
            next_slot: Mutex::new(now.checked_sub(interval).unwrap_or(now)),
            server_hint: Mutex::new(None),
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the next send slot. Must not be held across an await point, so
    /// the computed deadline is returned and slept on by the caller.
    fn claim_send_slot(&self) -> Instant {
        let now = Instant::now();
        let hint = Self::lock(&self.server_hint).take();
        let mut slot = Self::lock(&self.next_slot);

        let mut scheduled = now;
        if !self.interval.is_zero() {
            let next = *slot + self.interval;
            if next > scheduled {
                scheduled = next;
            }
        }
        if let Some(hint) = hint {
            if hint > scheduled {
                scheduled = hint;
            }
        }
        *slot = scheduled;
        scheduled
    }
}

#[async_trait]
impl Throttler for RateThrottler {
    fn max_retry_attempts(&self) -> usize {
        self.config.max_retry_attempts
    }

    async fn wait_to_proceed(&self, cancel: &CancellationToken) -> Result<(), AlpacaError> {
        if cancel.is_cancelled() {
            return Err(AlpacaError::Cancelled);
        }
        let scheduled = self.claim_send_slot();
        if scheduled <= Instant::now() {
            return Ok(());
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AlpacaError::Cancelled),
            _ = tokio::time::sleep_until(scheduled) => Ok(()),
        }
    }

    fn check_response(&self, response: &Response) -> bool {
        let status = response.status();
        if !self.config.retry_statuses.contains(&status) {
            return true;
        }
        if let Some(delay) = retry_after_delay(response.headers()) {
            let until = Instant::now() + delay;
            let mut hint = Self::lock(&self.server_hint);
            if hint.is_none_or(|existing| until > existing) {
                *hint = Some(until);
            }
        }
        false
    }
}

/// Parses a `Retry-After` header as either delta-seconds or an HTTP-date.
fn retry_after_delay(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?;
    let text = value.to_str().ok()?.trim();

    if let Ok(seconds) = text.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let ts = httpdate::parse_http_date(text).ok()?;
    ts.duration_since(SystemTime::now()).ok()
}
