//! Shiori: a cache-backed crawler for session-based job and profile pages
//!
//! This crate drives an external browser automation backend through the
//! [`driver::Driver`] trait, retries flaky page interactions with exponential
//! backoff, and keeps every scraped record in a local SQLite cache so repeated
//! requests never touch the browser again until the record expires.

pub mod cache;
pub mod config;
pub mod crawler;
pub mod driver;
pub mod extract;
pub mod output;
pub mod retry;
pub mod url;

use thiserror::Error;

/// Main error type for Shiori operations
#[derive(Debug, Error)]
pub enum ShioriError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] driver::DriverError),

    #[error("Retry error: {0}")]
    Retry(#[from] retry::RetryError),

    #[error("Cache error: {0}")]
    Cache(#[from] cache::StoreError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Email and password are required for login")]
    MissingCredentials,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Shiori operations
pub type Result<T> = std::result::Result<T, ShioriError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use cache::{cache_key, CacheRecord, RecordKind, RecordStore, SqliteCache};
pub use config::Config;
pub use crawler::{Crawler, CrawlRequest, CrawlResponse, LoginOutcome};
pub use retry::{RetryExecutor, RetryPolicy};
pub use url::canonical_url;
