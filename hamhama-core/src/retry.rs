//! Bounded retry with exponential backoff around a single LLM call.
//!
//! A call only counts as a success once the response text passes the
//! caller's structural validation; transport errors, API errors, blocked
//! prompts and unparseable bodies are all retried the same way.

use std::time::Duration;

use thiserror::Error;

use crate::llm::{GenerationRequest, LlmError, LlmProvider};
use crate::reconcile::ResponseError;

/// How often to try and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub extra_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts, waiting 2s then 3s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            extra_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (0-based): `base * 2^attempt + extra`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .saturating_add(self.extra_delay)
    }
}

/// Why a single attempt failed.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("invalid response: {0}")]
    Response(#[from] ResponseError),
}

/// Every attempt failed; the whole batch is unresolved for this run.
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {last_error}")]
pub struct BatchFailure {
    pub attempts: u32,
    pub last_error: AttemptError,
}

/// Call `provider` until `validate` accepts the response text or the policy
/// runs out of attempts.
///
/// Sleeps between attempts (never after the last one). A rate-limit error
/// with a `Retry-After` hint waits at least that long.
pub async fn call_with_retry<T, F>(
    provider: &dyn LlmProvider,
    request: &GenerationRequest,
    policy: &RetryPolicy,
    mut validate: F,
) -> Result<T, BatchFailure>
where
    F: FnMut(&str) -> Result<T, ResponseError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        tracing::debug!(
            provider = provider.provider_name(),
            attempt = attempt + 1,
            max_attempts,
            "Calling LLM"
        );

        let error = match provider.complete(request).await {
            Ok(text) => match validate(&text) {
                Ok(value) => return Ok(value),
                Err(e) => AttemptError::Response(e),
            },
            Err(e) => AttemptError::Llm(e),
        };

        tracing::warn!(attempt = attempt + 1, max_attempts, error = %error, "LLM attempt failed");

        if attempt + 1 >= max_attempts {
            return Err(BatchFailure {
                attempts: attempt + 1,
                last_error: error,
            });
        }

        let mut delay = policy.backoff(attempt);
        if let AttemptError::Llm(LlmError::RateLimited {
            retry_after_secs: Some(secs),
        }) = error
        {
            delay = delay.max(Duration::from_secs(secs));
        }

        tracing::info!(delay_ms = delay.as_millis() as u64, "Retrying after backoff");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
