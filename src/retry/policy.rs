use crate::config::CrawlerConfig;
use crate::{ConfigError, ConfigResult};
use std::time::Duration;

/// How often and how patiently an operation is retried
///
/// Immutable once built. A crawler shares one policy across every
/// executor invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    backoff_factor: f64,
}

impl RetryPolicy {
    /// Creates a policy
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `max_attempts` is zero or
    /// `backoff_factor` is below 1.0 or not finite.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> ConfigResult<Self> {
        if max_attempts == 0 {
            return Err(ConfigError::Validation(
                "max attempts must be at least 1".to_string(),
            ));
        }

        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(ConfigError::Validation(format!(
                "backoff factor must be a finite number >= 1.0, got {}",
                backoff_factor
            )));
        }

        Ok(Self {
            max_attempts,
            base_delay,
            backoff_factor,
        })
    }

    pub fn from_config(config: &CrawlerConfig) -> ConfigResult<Self> {
        Self::new(
            config.max_retries,
            config.retry_delay(),
            config.backoff_factor,
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Delay after the failed attempt with zero-based index `attempt`
    ///
    /// Saturates at `Duration::MAX` once the backoff outgrows `Duration`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}
