//! Browser automation seam
//!
//! The crawler never talks to a browser directly. It goes through the
//! [`Driver`] and [`Element`] traits, which an adapter for a concrete
//! automation backend implements. Errors are classified here so the retry
//! layer can tell a flaky page from a broken session.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a driver backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("No such element: {0}")]
    NoSuchElement(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element interaction failed: {0}")]
    Interaction(String),

    #[error("Browser session lost: {0}")]
    Session(String),
}

impl DriverError {
    /// Failures expected to clear up on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::StaleElement(_))
    }

    /// The DOM changed underneath us; the page must be reloaded
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleElement(_))
    }

    /// The session itself is gone and nothing further can succeed
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Session(_))
    }
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// A controlled browser session
///
/// A driver is used by one crawler at a time; implementations only need
/// `Sync` so the crawler can hold shared references across await points.
#[async_trait]
pub trait Driver: Send + Sync {
    type Element: Element;

    /// Loads `url` in the current tab
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// First element matching `selector`, if any
    async fn find_one(&self, selector: &str) -> DriverResult<Option<Self::Element>>;

    /// Every element matching `selector`, in document order
    async fn find_all(&self, selector: &str) -> DriverResult<Vec<Self::Element>>;

    /// Waits until `selector` matches, failing with [`DriverError::Timeout`]
    async fn wait_until_present(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> DriverResult<Self::Element>;

    async fn scroll_to_bottom(&self) -> DriverResult<()>;

    async fn current_url(&self) -> DriverResult<String>;

    /// Reloads the current page
    async fn refresh(&self) -> DriverResult<()>;

    /// Ends the browser session
    async fn quit(&self) -> DriverResult<()>;
}

/// A handle to a DOM element owned by a [`Driver`]
#[async_trait]
pub trait Element: Send + Sync + Sized {
    /// Rendered text content
    async fn text(&self) -> DriverResult<String>;

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>>;

    async fn click(&self) -> DriverResult<()>;

    /// Empties an input field
    async fn clear(&self) -> DriverResult<()>;

    async fn send_keys(&self, text: &str) -> DriverResult<()>;

    /// First descendant matching `selector`, if any
    async fn find_one(&self, selector: &str) -> DriverResult<Option<Self>>;
}
