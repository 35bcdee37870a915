//! Configuration module for Shiori
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The loaded [`Config`] is an ordinary value: build it once and hand it to
//! the constructors that need it.
//!
//! # Example
//!
//! ```no_run
//! use shiori::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shiori.toml")).unwrap();
//! println!("Cache expires after {} days", config.cache.expiry_days);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CacheConfig, Config, CrawlerConfig, Credentials, SiteConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
