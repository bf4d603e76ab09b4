//! Bounded retry with exponential backoff for query fetches.

use std::future::Future;
use std::time::Duration;

use sca_client::ApiResult;

use crate::config::QueryClientConfig;
use crate::key::QueryKey;

/// Retry parameters resolved for one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub fn from_config(config: &QueryClientConfig, retries: u32) -> Self {
        Self {
            retries,
            initial_delay: config.retry_delay,
            max_delay: config.max_retry_delay,
            multiplier: config.retry_multiplier,
        }
    }
}

/// Calculate the next backoff delay, clamped to [`RetryPolicy::max_delay`].
pub fn next_delay(current: Duration, policy: &RetryPolicy) -> Duration {
    let next_ms = (current.as_millis() as f64 * policy.multiplier) as u64;
    Duration::from_millis(next_ms).min(policy.max_delay)
}

/// Run `op` until it succeeds or `policy.retries` extra attempts are spent.
///
/// Returns the last error when every attempt fails.
pub async fn run_with_retry<T, F, Fut>(key: &QueryKey, policy: &RetryPolicy, mut op: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut delay = policy.initial_delay.min(policy.max_delay);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt > policy.retries => {
                tracing::warn!(key = %key, attempt, error = %e, "Query failed, giving up");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Query failed, retrying",
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                delay = next_delay(delay, policy);
            }
        }
    }
}
