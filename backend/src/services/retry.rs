//! Per-call timeouts and retry with exponential backoff.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::PipelineConfig;
use crate::error::{ParkingError, ParkingResult};

/// Retry settings for calls whose failure is fatal to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles after each retry
    pub initial_delay: Duration,
    /// Limit for every single attempt
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: config.retry_delay(),
            call_timeout: config.call_timeout(),
        }
    }

    /// Single attempt, no retries.
    pub fn no_retry(call_timeout: Duration) -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            call_timeout,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Await `future` for at most `limit`, turning expiry into a retryable `Timeout`.
pub async fn call_with_timeout<T, F>(limit: Duration, operation: &str, future: F) -> ParkingResult<T>
where
    F: Future<Output = ParkingResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(ParkingError::timeout(format!(
            "{} did not answer within {} ms",
            operation,
            limit.as_millis()
        ))
        .with_operation(operation)),
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or retries run out.
///
/// Each attempt is bounded by `policy.call_timeout`. Only retryable errors (timeouts and
/// transport failures) are retried. Cancelling `cancel` interrupts both the attempt and
/// the backoff sleep and yields `Cancelled`.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    cancel: &CancellationToken,
    mut call: F,
) -> ParkingResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ParkingResult<T>>,
{
    let mut delay = policy.initial_delay;
    let mut last_error = None;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            log::warn!(
                "Retrying {} (attempt {}/{}) in {:?}",
                operation,
                attempt + 1,
                policy.max_retries + 1,
                delay
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(operation)),
                _ = tokio::time::sleep(delay) => {}
            }
            delay *= 2;
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => return Err(cancelled(operation)),
            result = call_with_timeout(policy.call_timeout, operation, call()) => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                log::debug!("{} attempt {} failed: {}", operation, attempt + 1, e);
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        ParkingError::internal("Max retries exceeded with no error captured")
            .with_operation(operation)
    }))
}

fn cancelled(operation: &str) -> ParkingError {
    ParkingError::cancelled(format!("{} cancelled", operation)).with_operation(operation)
}
