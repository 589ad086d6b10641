//! Content generation behind a retrying wrapper.

use std::future::Future;
use std::time::Duration;

use lingo_core::exercise::{Exercise, LessonError};
use lingo_core::{ContentRequest, ProviderError, RetryPolicy};

/// A source of generated exercises.
pub trait ContentProvider: Send + Sync {
    fn name(&self) -> &str;

    fn generate(
        &self,
        request: &ContentRequest,
    ) -> impl Future<Output = Result<Vec<Exercise>, ProviderError>> + Send;
}

/// Waits between attempts. Swappable so tests can observe backoff.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retries a provider with exponential backoff and checks what it returns.
pub struct ReliableContentProvider<P, S = TokioSleeper> {
    primary: P,
    policy: RetryPolicy,
    sleeper: S,
}

impl<P: ContentProvider> ReliableContentProvider<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            policy: RetryPolicy::default(),
            sleeper: TokioSleeper,
        }
    }
}

impl<P: ContentProvider, S: Sleeper> ReliableContentProvider<P, S> {
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper<T: Sleeper>(self, sleeper: T) -> ReliableContentProvider<P, T> {
        ReliableContentProvider {
            primary: self.primary,
            policy: self.policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &P {
        &self.primary
    }
}

/// Reject payloads a session could not play.
fn check_exercises(exercises: Vec<Exercise>) -> Result<Vec<Exercise>, ProviderError> {
    if exercises.is_empty() {
        return Err(ProviderError::InvalidResponse("no exercises".to_string()));
    }
    exercises
        .iter()
        .try_for_each(Exercise::validate)
        .map_err(|e: LessonError| ProviderError::InvalidResponse(e.to_string()))?;
    Ok(exercises)
}

impl<P: ContentProvider, S: Sleeper> ContentProvider for ReliableContentProvider<P, S> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, request: &ContentRequest) -> Result<Vec<Exercise>, ProviderError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.primary.generate(request).await.and_then(check_exercises) {
                Ok(exercises) => {
                    if attempt > 1 {
                        tracing::info!(provider = self.name(), attempt, "generation recovered");
                    }
                    return Ok(exercises);
                }
                Err(e) => e,
            };

            if !self.policy.should_retry(attempt, &err) {
                tracing::warn!(
                    provider = self.name(),
                    attempt,
                    error = %err,
                    "generation failed, giving up"
                );
                return Err(err);
            }

            let delay = self.policy.delay_for(attempt - 1, &err);
            tracing::warn!(
                provider = self.name(),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "generation failed, retrying"
            );
            self.sleeper.sleep(delay).await;
        }
    }
}
