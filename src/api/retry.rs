// Bounded retry for idempotent list reads. Mutations are never retried: a
// status change is one request/response exchange, win or lose.

use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

use crate::api::errors::ApiError;
use crate::config::ListRetryConfig;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(cfg: &ListRetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts as usize,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }

    /// Run `operation`, replaying transient failures with jittered backoff.
    pub async fn run<T, F, Fut>(&self, operation: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let strategy = ExponentialBackoff::from_millis(self.base_delay.as_millis() as u64)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_attempts);
        RetryIf::spawn(strategy, operation, |err: &ApiError| {
            let retryable = err.is_retryable();
            if retryable {
                warn!(error = %err, "list fetch failed; retrying");
            }
            retryable
        })
        .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&ListRetryConfig::default())
    }
}
