use serde::Serialize;

/// Counters for one crawler's lifetime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub scrape_requests: u64,
    pub cache_hits: u64,
    pub fresh_scrapes: u64,
    pub failures: u64,
    pub searches: u64,
}

impl SessionStats {
    /// Share of scrape requests served from the cache, in percent
    ///
    /// Rounded to two decimals; 0.0 before any request.
    pub fn cache_hit_rate(&self) -> f64 {
        if self.scrape_requests == 0 {
            return 0.0;
        }
        let rate = self.cache_hits as f64 / self.scrape_requests as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}
