//! Human-readable cache and session statistics

use crate::cache::CacheStats;
use crate::crawler::SessionStats;
use std::fmt::Write;

/// Formats a byte count with binary units ("1.5 KB", "3.2 MB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

/// Renders cache statistics as a report
pub fn format_cache_stats(stats: &CacheStats) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Cache Statistics ===\n");
    let _ = writeln!(out, "Jobs:");
    let _ = writeln!(out, "  Total: {}", stats.total_jobs);
    let _ = writeln!(out, "  Valid: {}", stats.valid_jobs);
    let _ = writeln!(out, "  Expired: {}", stats.expired_jobs);
    let _ = writeln!(out);
    let _ = writeln!(out, "Profiles:");
    let _ = writeln!(out, "  Total: {}", stats.total_profiles);
    let _ = writeln!(out, "  Valid: {}", stats.valid_profiles);
    let _ = writeln!(out, "  Expired: {}", stats.expired_profiles);
    let _ = writeln!(out);
    let _ = writeln!(out, "Storage: {}", format_file_size(stats.storage_size_bytes));
    let _ = write!(out, "Expiry window: {} days", stats.expiry_days);

    out
}

pub fn print_cache_stats(stats: &CacheStats) {
    println!("{}", format_cache_stats(stats));
}

/// Renders the counters of one crawl session
pub fn format_session_stats(stats: &SessionStats) -> String {
    format!(
        "Scrape requests: {}\n  From cache: {}\n  Fresh: {}\n  Failed: {}\nSearches: {}\nCache hit rate: {:.2}%",
        stats.scrape_requests,
        stats.cache_hits,
        stats.fresh_scrapes,
        stats.failures,
        stats.searches,
        stats.cache_hit_rate()
    )
}
