//! Crawl pipeline
//!
//! This module sequences every crawl operation, including:
//! - Cache-first job and profile scrapes
//! - Job searches that collect listing links
//! - The login flow and its checkpoint hand-off
//! - Cache maintenance passthroughs and ordered shutdown
//!
//! All driver work runs through the crawler's [`RetryExecutor`].

mod login;
mod request;
mod scrape;
mod search;
mod session;

pub use request::{
    CrawlRequest, CrawlResponse, LoginOutcome, RecordSource, ScrapeRequest, Scraped,
    SearchRequest, DEFAULT_MAX_RESULTS,
};
pub use session::SessionStats;

use crate::cache::{
    CacheRecord, CacheStats, ClearReport, ExportSnapshot, RecordKind, RecordStore, SearchFilter,
    SqliteCache,
};
use crate::config::Config;
use crate::driver::Driver;
use crate::extract::FieldExtractor;
use crate::retry::{RetryExecutor, RetryPolicy, Sleeper, TokioSleeper};
use crate::ShioriError;
use std::path::Path;
use std::sync::Arc;

/// One logical browser session plus its cache
///
/// The crawler owns the driver and the store exclusively. Operations run
/// one at a time; anything that records progress takes `&mut self`.
pub struct Crawler<D, E, S = SqliteCache> {
    config: Config,
    driver: D,
    extractor: E,
    store: S,
    executor: RetryExecutor,
    sleeper: Arc<dyn Sleeper>,
    stats: SessionStats,
    signed_in: bool,
}

impl<D: Driver, E: FieldExtractor> Crawler<D, E, SqliteCache> {
    /// Creates a crawler backed by the configured SQLite cache
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `driver` - An open browser session
    /// * `extractor` - Reads record fields from loaded pages
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Cache opened and retry policy built
    /// * `Err(ShioriError)` - The cache could not be opened or the retry
    ///   settings are invalid
    pub fn new(config: Config, driver: D, extractor: E) -> Result<Self, ShioriError> {
        let store = SqliteCache::open(
            Path::new(&config.cache.database_path),
            config.cache.expiry_days,
        )?;
        Self::from_parts(config, driver, extractor, store, Arc::new(TokioSleeper))
    }
}

impl<D: Driver, E: FieldExtractor, S: RecordStore> Crawler<D, E, S> {
    /// Assembles a crawler from already-built parts
    pub fn from_parts(
        config: Config,
        driver: D,
        extractor: E,
        store: S,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, ShioriError> {
        let policy = Arc::new(RetryPolicy::from_config(&config.crawler)?);
        let executor = RetryExecutor::with_sleeper(policy, sleeper.clone());

        tracing::debug!(
            "Crawler ready: {} attempts per operation, {}ms base delay",
            executor.policy().max_attempts(),
            executor.policy().base_delay().as_millis()
        );

        Ok(Self {
            config,
            driver,
            extractor,
            store,
            executor,
            sleeper,
            stats: SessionStats::default(),
            signed_in: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn session_stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Runs a single request
    ///
    /// Search and scrape failures come back as an empty or `None`
    /// response. Only caller mistakes (an unusable URL) and a lost browser
    /// session are returned as errors.
    pub async fn execute(&mut self, request: CrawlRequest) -> Result<CrawlResponse, ShioriError> {
        match request {
            CrawlRequest::Search(search) => {
                let links = self
                    .search_jobs(&search.keywords, &search.location, search.max_results)
                    .await;
                Ok(CrawlResponse::Links(links))
            }
            CrawlRequest::Scrape(scrape) => {
                let record = self.scrape(&scrape.url, scrape.kind).await?;
                Ok(CrawlResponse::Record(record))
            }
        }
    }

    pub fn cache_stats(&self) -> Result<CacheStats, ShioriError> {
        Ok(self.store.stats()?)
    }

    /// Deletes cached records; `None` removes everything
    pub fn clear_cache(&mut self, older_than_days: Option<u32>) -> Result<ClearReport, ShioriError> {
        Ok(self.store.clear(older_than_days)?)
    }

    pub fn search_cache(
        &self,
        kind: RecordKind,
        filter: &SearchFilter,
    ) -> Result<Vec<CacheRecord>, ShioriError> {
        Ok(self.store.search(kind, filter)?)
    }

    pub fn export_cache(&self) -> Result<ExportSnapshot, ShioriError> {
        Ok(self.store.export_all()?)
    }

    /// Ends the browser session, then closes the cache
    ///
    /// Both steps always run. A failure in either is logged; the first one
    /// is returned.
    pub async fn shutdown(self) -> Result<(), ShioriError> {
        let Self {
            driver,
            store,
            stats,
            ..
        } = self;

        tracing::info!(
            "Session summary: {} scrapes ({} cached, {} fresh, {} failed), {} searches, {:.2}% cache hit rate",
            stats.scrape_requests,
            stats.cache_hits,
            stats.fresh_scrapes,
            stats.failures,
            stats.searches,
            stats.cache_hit_rate()
        );

        let quit = driver.quit().await;
        match &quit {
            Ok(()) => tracing::info!("Browser session closed"),
            Err(e) => tracing::error!("Failed to close browser session: {}", e),
        }

        let closed = store.close();
        if let Err(e) = &closed {
            tracing::error!("Failed to close cache: {}", e);
        }

        quit?;
        closed?;
        Ok(())
    }
}
