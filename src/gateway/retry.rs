use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use super::GatewayError;

/// Exponential backoff for transient gateway failures.
///
/// Backoff doubles per retry starting at `initial_backoff_ms`, capped at
/// `max_backoff_ms`. Permanent errors (unknown model, bad request, garbage
/// body) are returned immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, GatewayError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let delay = self.backoff_for(attempt);
                    log::warn!(
                        "Gateway attempt {} failed ({}), retrying in {:?}",
                        attempt + 1,
                        err,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
