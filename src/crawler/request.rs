use crate::cache::{CacheRecord, RecordKind};
use serde::Serialize;

/// Default number of links collected by a search
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// A single unit of crawl work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlRequest {
    Search(SearchRequest),
    Scrape(ScrapeRequest),
}

impl CrawlRequest {
    pub fn search(keywords: impl Into<String>, location: impl Into<String>) -> Self {
        Self::Search(SearchRequest::new(keywords, location))
    }

    pub fn job(url: impl Into<String>) -> Self {
        Self::Scrape(ScrapeRequest {
            url: url.into(),
            kind: RecordKind::Job,
        })
    }

    pub fn profile(url: impl Into<String>) -> Self {
        Self::Scrape(ScrapeRequest {
            url: url.into(),
            kind: RecordKind::Profile,
        })
    }
}

/// Job search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keywords: String,
    pub location: String,
    pub max_results: usize,
}

impl SearchRequest {
    pub fn new(keywords: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: location.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Page to scrape and what it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub url: String,
    pub kind: RecordKind,
}

/// Where a scraped record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    Cache,
    Live,
}

/// A record returned by a scrape
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scraped {
    pub record: CacheRecord,
    pub source: RecordSource,
}

impl Scraped {
    pub fn from_cache(&self) -> bool {
        self.source == RecordSource::Cache
    }
}

/// Result of [`CrawlRequest`] dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlResponse {
    /// Canonical job links from a search; empty when the search failed
    Links(Vec<String>),
    /// Scraped record, or `None` when the scrape failed
    Record(Option<Scraped>),
}

/// Where a login attempt ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn,
    /// The site wants a human to verify the session at `url`
    CheckpointRequired { url: String },
}
