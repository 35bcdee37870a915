use crate::cache::{cache_key, CacheRecord, RecordKind, RecordStore};
use crate::crawler::{Crawler, RecordSource, Scraped};
use crate::driver::Driver;
use crate::extract::FieldExtractor;
use crate::url::canonical_url;
use crate::ShioriError;

impl<D: Driver, E: FieldExtractor, S: RecordStore> Crawler<D, E, S> {
    /// Scrapes a job posting, serving it from the cache when possible
    pub async fn scrape_job(&mut self, url: &str) -> Result<Option<Scraped>, ShioriError> {
        self.scrape(url, RecordKind::Job).await
    }

    /// Scrapes a member profile, serving it from the cache when possible
    pub async fn scrape_profile(&mut self, url: &str) -> Result<Option<Scraped>, ShioriError> {
        self.scrape(url, RecordKind::Profile).await
    }

    /// Returns the record for `url`, from the cache or from the live page
    ///
    /// A valid cached record is returned without touching the driver. On a
    /// miss the page is loaded and extracted under the retry policy, and
    /// the result is cached before it is returned. A record that fails to
    /// cache is still returned.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Scraped))` - The record and where it came from
    /// * `Ok(None)` - The page could not be scraped
    /// * `Err(ShioriError::UrlError)` - `url` is not an http(s) URL
    /// * `Err(ShioriError::Retry)` - The browser session was lost
    pub async fn scrape(
        &mut self,
        url: &str,
        kind: RecordKind,
    ) -> Result<Option<Scraped>, ShioriError> {
        let canonical = canonical_url(url)?;
        let key = cache_key(&canonical);
        self.stats.scrape_requests += 1;

        match self.store.get(kind, &key) {
            Ok(Some(record)) => {
                tracing::info!("Using cached {} data for {}", kind, canonical);
                self.stats.cache_hits += 1;
                return Ok(Some(Scraped {
                    record,
                    source: RecordSource::Cache,
                }));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache lookup for {} failed, scraping instead: {}", canonical, e),
        }

        tracing::info!("Scraping {}: {}", kind, canonical);

        let label = format!("{} scrape", kind);
        let fetched = {
            let driver = &self.driver;
            let extractor = &self.extractor;
            let sleeper = self.sleeper.as_ref();
            let settle = self.config.crawler.page_settle();
            let target = canonical.as_str();

            self.executor
                .execute(driver, &label, move || async move {
                    driver.navigate(target).await?;
                    sleeper.sleep(settle).await;

                    // Profile sections load lazily
                    if kind == RecordKind::Profile {
                        driver.scroll_to_bottom().await?;
                        sleeper.sleep(settle).await;
                    }

                    extractor.extract(driver, kind).await
                })
                .await
        };

        let mut fields = match fetched {
            Ok(fields) => fields,
            Err(e) if e.last_error().is_fatal() => {
                self.stats.failures += 1;
                return Err(e.into());
            }
            Err(e) => {
                tracing::error!("Failed to scrape {} {}: {}", kind, canonical, e);
                self.stats.failures += 1;
                return Ok(None);
            }
        };

        fields.insert("url".to_string(), canonical.clone());

        let record = match self.store.put(kind, &key, &fields) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Returning uncached {} for {}: {}", kind, canonical, e);
                CacheRecord::new(key, kind, fields, self.store.now())
            }
        };

        self.stats.fresh_scrapes += 1;
        tracing::info!("Successfully scraped {}: {}", kind, canonical);

        Ok(Some(Scraped {
            record,
            source: RecordSource::Live,
        }))
    }
}
