//! Output module for reports and exports
//!
//! This module handles:
//! - Printing cache and session statistics
//! - Listing cached records found by an archive search
//! - Writing the JSON export file

mod export;
pub mod stats;

pub use export::write_export;
pub use stats::{
    format_cache_stats, format_file_size, format_session_stats, print_cache_stats,
};

use crate::cache::{CacheRecord, RecordKind};
use crate::extract::NOT_AVAILABLE;

/// One-line summary of a cached record
///
/// Jobs show title, company and location; profiles show name, headline
/// and location.
pub fn format_record_line(record: &CacheRecord) -> String {
    let field = |name: &str| record.field(name).unwrap_or(NOT_AVAILABLE).to_string();

    let (primary, secondary) = match record.kind {
        RecordKind::Job => (field("title"), field("company")),
        RecordKind::Profile => (field("name"), field("headline")),
    };

    format!(
        "{} | {} | {} (scraped {})",
        primary,
        secondary,
        field("location"),
        record.scraped_at.format("%Y-%m-%d %H:%M")
    )
}

/// Prints archive search results
pub fn print_search_results(kind: RecordKind, records: &[CacheRecord]) {
    println!("=== Cached {} matches: {} ===\n", kind, records.len());
    for record in records {
        println!("  - {}", format_record_line(record));
        if let Some(url) = record.field("url") {
            println!("    {}", url);
        }
    }
}
