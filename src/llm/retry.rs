//! Retry with exponential backoff for transient model failures.
//!
//! Retries only errors that `LlmError::is_retryable` marks as transient.
//! A rate limit waits for the larger of the API's `retry-after` and the
//! computed backoff.

use std::time::Duration;

use async_trait::async_trait;

use super::client::LlmClient;
use super::types::{CompletionRequest, CompletionResponse};
use crate::error::LlmError;

/// Backoff schedule for retried calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first call
    pub max_attempts: u32,
    /// Delay before the first retry; doubles each retry
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(64),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based) after `error`
    pub fn delay_for(&self, retry: u32, error: &LlmError) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1).min(16)));
        let delay = match error {
            LlmError::RateLimited { retry_after } => exp.max(*retry_after),
            _ => exp,
        };
        delay.min(self.max_delay)
    }
}

/// Wraps a client and retries transient failures per `RetryPolicy`.
pub struct RetryingClient<L: LlmClient> {
    inner: L,
    policy: RetryPolicy,
}

impl<L: LlmClient> RetryingClient<L> {
    pub fn new(inner: L, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<L: LlmClient> LlmClient for RetryingClient<L> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = self.policy.delay_for(attempt, &e);
                    tracing::warn!(
                        attempt,
                        max_attempts = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "model call failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
