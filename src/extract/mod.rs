//! Field extraction from loaded pages
//!
//! This module provides:
//! - The `FieldExtractor` trait the crawler calls once a page has loaded
//! - `SelectorExtractor`, which reads fields using CSS selector tables
//! - The selector tables for job postings, profiles, search and login
//! - Text cleanup and the "N/A" sentinel for missing fields

pub mod rules;
mod selector;
mod text;

pub use rules::{FieldRule, Strategy};
pub use selector::SelectorExtractor;
pub use text::{clean_text, NOT_AVAILABLE};

use crate::cache::{Fields, RecordKind};
use crate::driver::{Driver, DriverResult};
use async_trait::async_trait;

/// Reads a record's fields from the page the driver has loaded
///
/// Implementations never fail because a single field is missing; such
/// fields hold [`NOT_AVAILABLE`]. Errors are reserved for conditions the
/// caller has to react to, such as a stale page.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract<D: Driver>(&self, driver: &D, kind: RecordKind) -> DriverResult<Fields>;
}
