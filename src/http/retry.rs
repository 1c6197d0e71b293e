//! Retrying HTTP requests with capped exponential backoff
//!
//! Transient transport failures and a closed set of HTTP statuses are
//! retried; every other response is handed back untouched, including 4xx
//! client errors, which retrying cannot fix.

use std::error::Error as StdError;
use std::time::Duration;

use reqwest::{Client, IntoUrl, RequestBuilder, Response};
use tracing::debug;

use super::FetchError;

/// Substrings that mark an error message as a transient network failure
const NETWORK_ERROR_MARKERS: &[&str] = &[
    "econnrefused",
    "econnreset",
    "econnaborted",
    "etimedout",
    "enotfound",
    "eai_again",
    "epipe",
    "network error",
    "socket hang up",
    "connection refused",
    "connection reset",
    "connection closed",
    "broken pipe",
    "timed out",
    "dns error",
];

/// Retry and backoff parameters for one call site
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts made after the first one; total attempts is `max_retries + 1`
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub retryable_status_codes: Vec<u16>,
    /// Classifies a transport failure as transient
    pub retryable_error: fn(&reqwest::Error) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(16),
            backoff_multiplier: 2.0,
            retryable_status_codes: vec![429, 500, 502, 503, 504],
            retryable_error: is_transient,
        }
    }
}

impl RetryPolicy {
    /// For critical calls: more attempts, starting sooner, waiting longer at the tail
    pub fn aggressive() -> Self {
        Self {
            max_retries: 6,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            ..Self::default()
        }
    }

    /// For latency-sensitive, best-effort calls
    pub fn quick() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(2),
            ..Self::default()
        }
    }

    /// Single attempt, for callers that implement their own fallback
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based)
    ///
    /// `min(initial_delay * backoff_multiplier^(attempt - 1), max_delay)`
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let initial = self.initial_delay.as_nanos();
        let cap = self.max_delay.as_nanos();
        let multiplier = self.backoff_multiplier;

        let nanos = if multiplier >= 0.0 && multiplier.fract() == 0.0 {
            let factor = (multiplier.min(u32::MAX as f64) as u128).saturating_pow(exponent);
            initial.saturating_mul(factor)
        } else {
            let scaled = (initial as f64 * multiplier.powi(exponent.min(i32::MAX as u32) as i32)).round();
            if !scaled.is_finite() || scaled >= cap as f64 {
                cap
            } else {
                scaled.max(0.0) as u128
            }
        };

        if nanos >= cap {
            return self.max_delay;
        }
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    pub fn is_retryable(&self, err: &reqwest::Error) -> bool {
        (self.retryable_error)(err)
    }
}

/// Whether an error message describes a transient network failure
pub fn is_network_error(message: &str) -> bool {
    let message = message.to_lowercase();
    NETWORK_ERROR_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

/// Default transport-failure classifier
///
/// Timeouts and connect failures are always transient. Anything else is
/// judged by the messages along its source chain.
pub fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    if err.is_builder() || err.is_redirect() || err.is_decode() {
        return false;
    }

    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if is_network_error(&current.to_string()) {
            return true;
        }
        source = current.source();
    }
    false
}

/// Sends `request`, retrying according to `policy`
///
/// # Returns
/// * `Ok(Response)` - The first response whose status is not retryable
/// * `Err(FetchError::RetriesExhausted)` - A retryable status persisted on the last attempt
/// * `Err(FetchError::Network)` - A non-transient transport failure, or a transient one on the last attempt
pub async fn fetch_with_retry(
    client: &Client,
    request: RequestBuilder,
    policy: &RetryPolicy,
) -> Result<Response, FetchError> {
    let mut attempt: u32 = 1;

    loop {
        let outgoing = request
            .try_clone()
            .ok_or(FetchError::UnclonableRequest)?
            .build()?;
        let method = outgoing.method().clone();
        let url = outgoing.url().clone();
        debug!(attempt, %method, %url, "sending HTTP request");

        match client.execute(outgoing).await {
            Ok(response) => {
                let status = response.status().as_u16();
                if !policy.is_retryable_status(status) {
                    return Ok(response);
                }
                if attempt > policy.max_retries {
                    return Err(FetchError::RetriesExhausted {
                        status,
                        retries: policy.max_retries,
                    });
                }
                debug!(attempt, %method, %url, status, "retryable HTTP status");
            }
            Err(err) => {
                if attempt > policy.max_retries || !policy.is_retryable(&err) {
                    return Err(FetchError::Network(err));
                }
                debug!(attempt, %method, %url, error = %err, "transient HTTP failure");
            }
        }

        let delay = policy.calculate_delay(attempt);
        debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// GET `url` with retries
pub async fn get_with_retry<U: IntoUrl>(
    client: &Client,
    url: U,
    policy: &RetryPolicy,
) -> Result<Response, FetchError> {
    fetch_with_retry(client, client.get(url), policy).await
}
