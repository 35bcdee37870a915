use crate::driver::{Driver, DriverResult};
use crate::retry::{RetryError, RetryPolicy, Sleeper, TokioSleeper};
use std::future::Future;
use std::sync::Arc;

/// Runs driver operations under a [`RetryPolicy`]
#[derive(Clone)]
pub struct RetryExecutor {
    policy: Arc<RetryPolicy>,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryExecutor {
    pub fn new(policy: Arc<RetryPolicy>) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(policy: Arc<RetryPolicy>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation` until it succeeds or the policy gives up
    ///
    /// Timeouts and stale element references are retried after
    /// `base_delay * backoff_factor^attempt`. After a stale reference the
    /// page is reloaded through `driver` before the next attempt; a failed
    /// reload is logged and the attempt goes ahead anyway.
    ///
    /// # Errors
    ///
    /// * `RetryError::Aborted` - the operation failed with a non-transient
    ///   error; no further attempts were made
    /// * `RetryError::Exhausted` - every attempt failed with a transient
    ///   error; carries the last one
    pub async fn execute<D, T, F, Fut>(
        &self,
        driver: &D,
        label: &str,
        mut operation: F,
    ) -> Result<T, RetryError>
    where
        D: Driver,
        F: FnMut() -> Fut,
        Fut: Future<Output = DriverResult<T>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!("{} succeeded on attempt {}", label, attempt + 1);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::error!("{} failed: {}", label, error);
                return Err(RetryError::Aborted(error));
            }

            if attempt + 1 >= max_attempts {
                tracing::error!("{} failed after {} attempts: {}", label, max_attempts, error);
                return Err(RetryError::Exhausted {
                    attempts: max_attempts,
                    source: error,
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::warn!(
                "{} attempt {}/{} failed: {}. Retrying in {:?}",
                label,
                attempt + 1,
                max_attempts,
                error,
                delay
            );
            self.sleeper.sleep(delay).await;

            if error.is_stale() {
                tracing::debug!("Reloading page after stale element in {}", label);
                if let Err(e) = driver.refresh().await {
                    tracing::warn!("Page reload before retrying {} failed: {}", label, e);
                }
            }

            attempt += 1;
        }
    }
}
