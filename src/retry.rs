use crate::history::Turn;
use crate::llm_client::{CompletionError, GenerationOptions, LLMClient};
use async_trait::async_trait;
use std::time::Duration;

/// Policy controlling how many times an operation is retried and the delay
/// between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: usize,
    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a new policy.
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Execute `op`, retrying on error according to the policy.
    pub async fn retry<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(_error) if attempts < self.max_retries => {
                    attempts += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Wrapper around an [`LLMClient`] that applies a [`RetryPolicy`].
#[derive(Clone)]
pub struct RetryLLM<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C> RetryLLM<C> {
    /// Construct a retrying client.
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C> LLMClient for RetryLLM<C>
where
    C: LLMClient + Send + Sync,
{
    async fn complete(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        self.policy
            .retry(|| self.inner.complete(turns, options))
            .await
    }
}
