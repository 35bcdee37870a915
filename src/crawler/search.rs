use crate::cache::{RecordKind, RecordStore};
use crate::config::SiteConfig;
use crate::crawler::Crawler;
use crate::driver::{Driver, DriverResult, Element};
use crate::extract::rules::{CARD_LINK_SELECTOR, SEARCH_CARD_SELECTOR};
use crate::extract::FieldExtractor;
use crate::url::{build_search_url, canonical_url, is_resource_url, site_url};

impl<D: Driver, E: FieldExtractor, S: RecordStore> Crawler<D, E, S> {
    /// Collects job posting links from a search listing
    ///
    /// Listings are never cached. Cards without a usable job link are
    /// skipped one by one; a search that fails outright logs the failure
    /// and returns an empty list.
    ///
    /// # Arguments
    ///
    /// * `keywords` - Search terms
    /// * `location` - Location filter, may be empty
    /// * `max_results` - Number of cards to inspect
    pub async fn search_jobs(
        &mut self,
        keywords: &str,
        location: &str,
        max_results: usize,
    ) -> Vec<String> {
        self.stats.searches += 1;

        let search_url = match build_search_url(&self.config.site, keywords, location) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Cannot build search URL for '{}': {}", keywords, e);
                self.stats.failures += 1;
                return Vec::new();
            }
        };

        tracing::info!("Searching jobs: '{}' in '{}'", keywords, location);

        let result = {
            let driver = &self.driver;
            let site = &self.config.site;
            let sleeper = self.sleeper.as_ref();
            let settle = self.config.crawler.page_settle();
            let scroll_passes = self.config.crawler.scroll_passes;
            let target = search_url.as_str();

            self.executor
                .execute(driver, "job search", move || async move {
                    driver.navigate(target).await?;
                    sleeper.sleep(settle).await;

                    // Results load as the listing scrolls
                    for _ in 0..scroll_passes {
                        driver.scroll_to_bottom().await?;
                        sleeper.sleep(settle).await;
                    }

                    let cards = driver.find_all(SEARCH_CARD_SELECTOR).await?;
                    let mut links = Vec::new();

                    for (index, card) in cards.iter().take(max_results).enumerate() {
                        match card_link(site, card).await {
                            Ok(Some(link)) => links.push(link),
                            Ok(None) => tracing::debug!("Skipping card {}: no job link", index),
                            Err(e) => tracing::debug!("Skipping card {}: {}", index, e),
                        }
                    }

                    Ok(links)
                })
                .await
        };

        match result {
            Ok(links) => {
                tracing::info!("Found {} job listings", links.len());
                links
            }
            Err(e) => {
                tracing::error!("Job search for '{}' failed: {}", keywords, e);
                self.stats.failures += 1;
                Vec::new()
            }
        }
    }
}

/// Reads the canonical job link out of a search card
async fn card_link<El: Element>(site: &SiteConfig, card: &El) -> DriverResult<Option<String>> {
    let Some(anchor) = card.find_one(CARD_LINK_SELECTOR).await? else {
        return Ok(None);
    };
    let Some(href) = anchor.attribute("href").await? else {
        return Ok(None);
    };

    // Listings may use site-relative links
    let Ok(resolved) = site_url(site, href.trim()) else {
        return Ok(None);
    };

    if !is_resource_url(site, resolved.as_str(), RecordKind::Job) {
        return Ok(None);
    }

    Ok(canonical_url(resolved.as_str()).ok())
}
