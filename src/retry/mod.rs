//! Retry with exponential backoff for driver operations
//!
//! Every browser interaction the crawler performs runs through a
//! [`RetryExecutor`]. Timeouts and stale element references are retried
//! after a growing delay; stale references additionally reload the page.
//! Every other failure ends the operation on the spot.

mod executor;
mod policy;
mod sleeper;

pub use executor::RetryExecutor;
pub use policy::RetryPolicy;
pub use sleeper::{Sleeper, TokioSleeper};

use crate::driver::DriverError;
use thiserror::Error;

/// Why a retried operation gave up
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RetryError {
    #[error("Gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: DriverError,
    },

    #[error("Aborted on non-retryable error: {0}")]
    Aborted(#[source] DriverError),
}

impl RetryError {
    /// The driver error that ended the operation
    pub fn last_error(&self) -> &DriverError {
        match self {
            Self::Exhausted { source, .. } => source,
            Self::Aborted(source) => source,
        }
    }
}
