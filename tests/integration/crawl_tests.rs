//! Integration tests for the crawl pipeline
//!
//! These tests drive a `Crawler` against a scripted in-memory browser:
//! pages are keyed by URL, and failures can be queued for specific driver
//! calls to exercise retry, cache and login behaviour end-to-end.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use shiori::cache::{
    cache_key, CacheRecord, CacheStats, Clock, ClearReport, ExportSnapshot, Fields, ManualClock,
    RecordKind, RecordStore, SearchFilter, SqliteCache, StoreError, StoreResult, SystemClock,
};
use shiori::config::{CacheConfig, Config, Credentials, CrawlerConfig, SiteConfig};
use shiori::crawler::{CrawlRequest, CrawlResponse, Crawler, LoginOutcome, RecordSource};
use shiori::driver::{Driver, DriverError, DriverResult, Element};
use shiori::extract::rules::{JOB_RULES, PROFILE_RULES, SEARCH_CARD_SELECTOR};
use shiori::extract::{SelectorExtractor, NOT_AVAILABLE};
use shiori::retry::{RetryError, Sleeper};
use shiori::url::build_search_url;
use shiori::ShioriError;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const JOB_URL: &str = "https://www.linkedin.com/jobs/view/3791";
const PROFILE_URL: &str = "https://www.linkedin.com/in/ann-example";
const LOGIN_URL: &str = "https://www.linkedin.com/login";
const FEED_URL: &str = "https://www.linkedin.com/feed/";
const CHECKPOINT_URL: &str = "https://www.linkedin.com/checkpoint/challenge/abc";

// ---------------------------------------------------------------------------
// Scripted driver
// ---------------------------------------------------------------------------

/// Static description of an element on a scripted page
#[derive(Clone, Default)]
struct ElementSpec {
    text: String,
    attributes: HashMap<String, String>,
    children: HashMap<String, ElementSpec>,
    text_error: Option<DriverError>,
    click_to: Option<String>,
}

impl ElementSpec {
    fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    fn card(href: &str) -> Self {
        let mut anchor = Self::default();
        anchor.attributes.insert("href".to_string(), href.to_string());
        let mut card = Self::default();
        card.children.insert("a".to_string(), anchor);
        card
    }

    fn navigates_to(url: &str) -> Self {
        Self {
            click_to: Some(url.to_string()),
            ..Self::default()
        }
    }
}

type Page = HashMap<String, Vec<ElementSpec>>;

#[derive(Default)]
struct State {
    pages: HashMap<String, Page>,
    current_url: String,
    navigations: Vec<String>,
    refreshes: u32,
    scrolls: u32,
    quits: u32,
    typed: Vec<String>,
    failures: VecDeque<(&'static str, DriverError)>,
    quit_error: Option<DriverError>,
}

impl State {
    /// Pops the first queued failure for `op`, if any
    fn take_failure(&mut self, op: &str) -> DriverResult<()> {
        match self.failures.iter().position(|(o, _)| *o == op) {
            Some(index) => Err(self.failures.remove(index).map(|(_, e)| e).unwrap()),
            None => Ok(()),
        }
    }

    fn current_page(&self) -> Option<&Page> {
        self.pages.get(&self.current_url)
    }

    fn matches(&self, selector: &str) -> Vec<ElementSpec> {
        self.current_page()
            .and_then(|page| page.get(selector))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Clone, Default)]
struct ScriptedDriver {
    state: Arc<Mutex<State>>,
}

impl ScriptedDriver {
    fn with_page(self, url: &str, elements: Vec<(&str, Vec<ElementSpec>)>) -> Self {
        let page = elements
            .into_iter()
            .map(|(selector, specs)| (selector.to_string(), specs))
            .collect();
        self.state.lock().unwrap().pages.insert(url.to_string(), page);
        self
    }

    fn fail_next(&self, op: &'static str, error: DriverError) {
        self.state.lock().unwrap().failures.push_back((op, error));
    }

    fn set_current_url(&self, url: &str) {
        self.state.lock().unwrap().current_url = url.to_string();
    }

    fn fail_quit(&self, error: DriverError) {
        self.state.lock().unwrap().quit_error = Some(error);
    }

    fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    fn refreshes(&self) -> u32 {
        self.state.lock().unwrap().refreshes
    }

    fn scrolls(&self) -> u32 {
        self.state.lock().unwrap().scrolls
    }

    fn quits(&self) -> u32 {
        self.state.lock().unwrap().quits
    }

    fn typed(&self) -> Vec<String> {
        self.state.lock().unwrap().typed.clone()
    }

    fn element(&self, spec: ElementSpec) -> ScriptedElement {
        ScriptedElement {
            spec,
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl Driver for ScriptedDriver {
    type Element = ScriptedElement;

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.take_failure("navigate")?;
        state.current_url = url.to_string();
        Ok(())
    }

    async fn find_one(&self, selector: &str) -> DriverResult<Option<ScriptedElement>> {
        let found = {
            let mut state = self.state.lock().unwrap();
            state.take_failure("find")?;
            state.matches(selector).into_iter().next()
        };
        Ok(found.map(|spec| self.element(spec)))
    }

    async fn find_all(&self, selector: &str) -> DriverResult<Vec<ScriptedElement>> {
        let found = {
            let mut state = self.state.lock().unwrap();
            state.take_failure("find")?;
            state.matches(selector)
        };
        Ok(found.into_iter().map(|spec| self.element(spec)).collect())
    }

    async fn wait_until_present(
        &self,
        selector: &str,
        _timeout: Duration,
    ) -> DriverResult<ScriptedElement> {
        let found = {
            let mut state = self.state.lock().unwrap();
            state.take_failure("wait")?;
            state.matches(selector).into_iter().next()
        };
        found
            .map(|spec| self.element(spec))
            .ok_or_else(|| DriverError::Timeout(selector.to_string()))
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        let mut state = self.state.lock().unwrap();
        state.take_failure("current_url")?;
        Ok(state.current_url.clone())
    }

    async fn refresh(&self) -> DriverResult<()> {
        self.state.lock().unwrap().refreshes += 1;
        Ok(())
    }

    async fn quit(&self) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.quits += 1;
        match state.quit_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

struct ScriptedElement {
    spec: ElementSpec,
    state: Arc<Mutex<State>>,
}

#[async_trait]
impl Element for ScriptedElement {
    async fn text(&self) -> DriverResult<String> {
        match &self.spec.text_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.spec.text.clone()),
        }
    }

    async fn attribute(&self, name: &str) -> DriverResult<Option<String>> {
        Ok(self.spec.attributes.get(name).cloned())
    }

    async fn click(&self) -> DriverResult<()> {
        if let Some(url) = &self.spec.click_to {
            self.state.lock().unwrap().current_url = url.clone();
        }
        Ok(())
    }

    async fn clear(&self) -> DriverResult<()> {
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> DriverResult<()> {
        self.state.lock().unwrap().typed.push(text.to_string());
        Ok(())
    }

    async fn find_one(&self, selector: &str) -> DriverResult<Option<Self>> {
        Ok(self.spec.children.get(selector).map(|spec| ScriptedElement {
            spec: spec.clone(),
            state: self.state.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// SQLite store that can refuse writes and reports when it is closed
struct TrackingStore {
    inner: SqliteCache,
    reject_puts: bool,
    closed: Arc<AtomicBool>,
}

impl TrackingStore {
    fn new(reject_puts: bool) -> (Self, Arc<AtomicBool>) {
        Self::with_clock(reject_puts, Arc::new(SystemClock))
    }

    fn with_clock(reject_puts: bool, clock: Arc<dyn Clock>) -> (Self, Arc<AtomicBool>) {
        let closed = Arc::new(AtomicBool::new(false));
        let store = Self {
            inner: SqliteCache::open_in_memory(7, clock).unwrap(),
            reject_puts,
            closed: closed.clone(),
        };
        (store, closed)
    }
}

impl RecordStore for TrackingStore {
    fn get(&self, kind: RecordKind, key: &str) -> StoreResult<Option<CacheRecord>> {
        self.inner.get(kind, key)
    }

    fn now(&self) -> DateTime<Utc> {
        self.inner.now()
    }

    fn put(&mut self, kind: RecordKind, key: &str, fields: &Fields) -> StoreResult<CacheRecord> {
        if self.reject_puts {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.put(kind, key, fields)
    }

    fn stats(&self) -> StoreResult<CacheStats> {
        self.inner.stats()
    }

    fn clear(&mut self, older_than_days: Option<u32>) -> StoreResult<ClearReport> {
        self.inner.clear(older_than_days)
    }

    fn search(&self, kind: RecordKind, filter: &SearchFilter) -> StoreResult<Vec<CacheRecord>> {
        self.inner.search(kind, filter)
    }

    fn export_all(&self) -> StoreResult<ExportSnapshot> {
        self.inner.export_all()
    }

    fn close(self) -> StoreResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        self.inner.close()
    }
}

fn test_config(db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            wait_timeout_secs: 1,
            ..CrawlerConfig::default()
        },
        cache: CacheConfig {
            database_path: db_path.to_string(),
            expiry_days: 7,
        },
        site: SiteConfig::default(),
        credentials: None,
    }
}

fn selector(kind: RecordKind, field: &str) -> &'static str {
    let rules = match kind {
        RecordKind::Job => JOB_RULES,
        RecordKind::Profile => PROFILE_RULES,
    };
    rules
        .iter()
        .find(|rule| rule.name == field)
        .map(|rule| rule.selectors)
        .unwrap()
}

fn job_page() -> Vec<(&'static str, Vec<ElementSpec>)> {
    vec![
        (selector(RecordKind::Job, "title"), vec![ElementSpec::text("Senior Rust Engineer")]),
        (selector(RecordKind::Job, "company"), vec![ElementSpec::text("Acme")]),
        (selector(RecordKind::Job, "location"), vec![ElementSpec::text(" Berlin,\n Germany ")]),
        (
            selector(RecordKind::Job, "description"),
            vec![ElementSpec::text("Build resilient crawlers.")],
        ),
    ]
}

fn profile_page() -> Vec<(&'static str, Vec<ElementSpec>)> {
    vec![
        (selector(RecordKind::Profile, "name"), vec![ElementSpec::text("Ann Example")]),
        (
            selector(RecordKind::Profile, "headline"),
            vec![ElementSpec::text("Engineer at Acme")],
        ),
    ]
}

fn login_page(lands_on: &str) -> Vec<(&'static str, Vec<ElementSpec>)> {
    vec![
        ("#username", vec![ElementSpec::default()]),
        ("#password", vec![ElementSpec::default()]),
        ("button[type=\"submit\"]", vec![ElementSpec::navigates_to(lands_on)]),
    ]
}

type TestCrawler<S = SqliteCache> = Crawler<ScriptedDriver, SelectorExtractor, S>;

fn crawler_with_store<S: RecordStore>(
    driver: &ScriptedDriver,
    store: S,
) -> (TestCrawler<S>, Arc<RecordingSleeper>) {
    let config = test_config(":memory:");
    let sleeper = Arc::new(RecordingSleeper::default());
    let extractor = SelectorExtractor::from_config(&config.crawler);
    let crawler =
        Crawler::from_parts(config, driver.clone(), extractor, store, sleeper.clone()).unwrap();
    (crawler, sleeper)
}

fn crawler(driver: &ScriptedDriver) -> (TestCrawler, Arc<RecordingSleeper>) {
    let store = SqliteCache::open_in_memory(7, Arc::new(SystemClock)).unwrap();
    crawler_with_store(driver, store)
}

// ---------------------------------------------------------------------------
// Scraping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_scrape_job_then_serve_from_cache() {
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    let (mut crawler, _) = crawler(&driver);

    let first = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();
    assert_eq!(first.source, RecordSource::Live);
    assert_eq!(first.record.field("title"), Some("Senior Rust Engineer"));
    assert_eq!(first.record.field("location"), Some("Berlin, Germany"));
    assert_eq!(first.record.field("url"), Some(JOB_URL));
    assert_eq!(first.record.key, cache_key(JOB_URL));

    let second = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();
    assert!(second.from_cache());
    assert_eq!(second.record.fields, first.record.fields);

    // The cache hit never touched the browser
    assert_eq!(driver.navigations().len(), 1);

    let stats = crawler.session_stats();
    assert_eq!(stats.scrape_requests, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.fresh_scrapes, 1);
    assert_eq!(stats.cache_hit_rate(), 50.0);
}

#[tokio::test]
async fn test_scrape_uses_canonical_url() {
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    let (mut crawler, _) = crawler(&driver);

    let scraped = crawler
        .scrape_job("https://WWW.LinkedIn.com/jobs/view/3791/?trackingId=xyz#apply")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(driver.navigations(), vec![JOB_URL.to_string()]);
    assert_eq!(scraped.record.key, cache_key(JOB_URL));

    // A differently decorated link to the same posting is a cache hit
    let again = crawler
        .scrape_job("https://www.linkedin.com/jobs/view/3791?refId=1")
        .await
        .unwrap()
        .unwrap();
    assert!(again.from_cache());
}

#[tokio::test]
async fn test_partial_record_is_cached() {
    let driver = ScriptedDriver::default().with_page(
        JOB_URL,
        vec![(selector(RecordKind::Job, "title"), vec![ElementSpec::text("Data Engineer")])],
    );
    let (mut crawler, _) = crawler(&driver);

    let scraped = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();
    assert_eq!(scraped.record.field("title"), Some("Data Engineer"));
    assert_eq!(scraped.record.field("company"), Some(NOT_AVAILABLE));
    assert_eq!(scraped.record.field("seniority_level"), Some(NOT_AVAILABLE));

    assert_eq!(crawler.cache_stats().unwrap().valid_jobs, 1);
    assert!(crawler.scrape_job(JOB_URL).await.unwrap().unwrap().from_cache());
}

#[tokio::test]
async fn test_stale_element_reloads_and_retries() {
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    driver.fail_next("wait", DriverError::StaleElement("title".to_string()));
    let (mut crawler, sleeper) = crawler(&driver);

    let scraped = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();

    assert_eq!(scraped.record.field("title"), Some("Senior Rust Engineer"));
    assert_eq!(driver.refreshes(), 1);
    assert_eq!(driver.navigations().len(), 2);

    // One settle per attempt plus one backoff
    let slept = sleeper.slept.lock().unwrap().clone();
    assert!(slept.contains(&Duration::from_millis(2000)));
}

#[tokio::test]
async fn test_exhausted_scrape_returns_none() {
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    for _ in 0..3 {
        driver.fail_next("navigate", DriverError::Timeout("page load".to_string()));
    }
    let (mut crawler, sleeper) = crawler(&driver);

    let result = crawler.scrape_job(JOB_URL).await.unwrap();

    assert!(result.is_none());
    assert_eq!(driver.navigations().len(), 3);
    assert_eq!(driver.refreshes(), 0);
    assert_eq!(
        *sleeper.slept.lock().unwrap(),
        vec![Duration::from_millis(2000), Duration::from_millis(4000)]
    );
    assert_eq!(crawler.session_stats().failures, 1);
    assert_eq!(crawler.cache_stats().unwrap().total_jobs, 0);
}

#[tokio::test]
async fn test_non_transient_failure_is_not_retried() {
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    driver.fail_next(
        "navigate",
        DriverError::Navigation {
            url: JOB_URL.to_string(),
            reason: "net::ERR_CONNECTION_RESET".to_string(),
        },
    );
    let (mut crawler, sleeper) = crawler(&driver);

    assert!(crawler.scrape_job(JOB_URL).await.unwrap().is_none());
    assert_eq!(driver.navigations().len(), 1);
    assert!(sleeper.slept.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_lost_session_is_an_error() {
    let driver = ScriptedDriver::default();
    driver.fail_next("navigate", DriverError::Session("browser crashed".to_string()));
    let (mut crawler, _) = crawler(&driver);

    let result = crawler.scrape_job(JOB_URL).await;

    assert!(matches!(
        result,
        Err(ShioriError::Retry(RetryError::Aborted(DriverError::Session(_))))
    ));
}

#[tokio::test]
async fn test_invalid_url_is_rejected() {
    let driver = ScriptedDriver::default();
    let (mut crawler, _) = crawler(&driver);

    let result = crawler.scrape_job("ftp://www.linkedin.com/jobs/view/1").await;

    assert!(matches!(result, Err(ShioriError::UrlError(_))));
    assert!(driver.navigations().is_empty());
    assert_eq!(crawler.session_stats().scrape_requests, 0);
}

#[tokio::test]
async fn test_failed_cache_write_still_returns_record() {
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    let (store, _) = TrackingStore::new(true);
    let (mut crawler, _) = crawler_with_store(&driver, store);

    let scraped = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();
    assert_eq!(scraped.source, RecordSource::Live);
    assert_eq!(scraped.record.field("company"), Some("Acme"));

    // Nothing was cached, so the next request goes back to the browser
    let again = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();
    assert_eq!(again.source, RecordSource::Live);
    assert_eq!(driver.navigations().len(), 2);
}

#[tokio::test]
async fn test_uncached_record_uses_store_clock() {
    let frozen = Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap();
    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    let (store, _) = TrackingStore::with_clock(true, Arc::new(ManualClock::new(frozen)));
    let (mut crawler, _) = crawler_with_store(&driver, store);

    let scraped = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();

    assert_eq!(scraped.source, RecordSource::Live);
    assert_eq!(scraped.record.scraped_at, frozen);
}

#[tokio::test]
async fn test_profile_scrape_scrolls_for_lazy_sections() {
    let driver = ScriptedDriver::default().with_page(PROFILE_URL, profile_page());
    let (mut crawler, _) = crawler(&driver);

    let scraped = crawler.scrape_profile(PROFILE_URL).await.unwrap().unwrap();

    assert_eq!(scraped.record.kind, RecordKind::Profile);
    assert_eq!(scraped.record.field("name"), Some("Ann Example"));
    assert_eq!(scraped.record.field("about"), Some(NOT_AVAILABLE));
    assert_eq!(driver.scrolls(), 1);

    let found = crawler
        .search_cache(RecordKind::Profile, &SearchFilter::default().with_company("acme"))
        .unwrap();
    assert_eq!(found.len(), 1);
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn search_url(keywords: &str, location: &str) -> String {
    build_search_url(&SiteConfig::default(), keywords, location).unwrap()
}

#[tokio::test]
async fn test_search_skips_bad_cards_and_honours_limit() {
    let cards = vec![
        ElementSpec::card("/jobs/view/1/?refId=abc"),
        ElementSpec::default(),
        ElementSpec::card("https://www.linkedin.com/company/acme/"),
        ElementSpec::card("https://www.linkedin.com/jobs/view/2#details"),
        ElementSpec::card("https://www.linkedin.com/jobs/view/3"),
    ];
    let driver = ScriptedDriver::default().with_page(
        &search_url("rust", "Berlin"),
        vec![(SEARCH_CARD_SELECTOR, cards)],
    );
    let (mut crawler, _) = crawler(&driver);

    let links = crawler.search_jobs("rust", "Berlin", 4).await;

    assert_eq!(
        links,
        vec![
            "https://www.linkedin.com/jobs/view/1".to_string(),
            "https://www.linkedin.com/jobs/view/2".to_string(),
        ]
    );
    assert_eq!(driver.scrolls(), 3);

    // Listings are never cached
    assert_eq!(crawler.cache_stats().unwrap().total_records(), 0);
}

#[tokio::test]
async fn test_failed_search_returns_empty() {
    let driver = ScriptedDriver::default();
    for _ in 0..3 {
        driver.fail_next("find", DriverError::Timeout("cards".to_string()));
    }
    let (mut crawler, _) = crawler(&driver);

    let links = crawler.search_jobs("rust", "", 10).await;

    assert!(links.is_empty());
    assert_eq!(driver.navigations().len(), 3);
    assert_eq!(crawler.session_stats().failures, 1);
}

#[tokio::test]
async fn test_execute_dispatches_requests() {
    let driver = ScriptedDriver::default()
        .with_page(JOB_URL, job_page())
        .with_page(
            &search_url("rust", "Remote"),
            vec![(SEARCH_CARD_SELECTOR, vec![ElementSpec::card(JOB_URL)])],
        );
    let (mut crawler, _) = crawler(&driver);

    let response = crawler
        .execute(CrawlRequest::search("rust", "Remote"))
        .await
        .unwrap();
    let links = match response {
        CrawlResponse::Links(links) => links,
        other => panic!("unexpected response {:?}", other),
    };
    assert_eq!(links, vec![JOB_URL.to_string()]);

    let response = crawler.execute(CrawlRequest::job(&links[0])).await.unwrap();
    match response {
        CrawlResponse::Record(Some(scraped)) => {
            assert_eq!(scraped.record.field("company"), Some("Acme"))
        }
        other => panic!("unexpected response {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_login_signs_in() {
    let driver = ScriptedDriver::default().with_page(LOGIN_URL, login_page(FEED_URL));
    let (mut crawler, _) = crawler(&driver);

    let outcome = crawler
        .login(&Credentials::new("ann@example.com", "hunter2"))
        .await
        .unwrap();

    assert_eq!(outcome, LoginOutcome::SignedIn);
    assert!(crawler.is_signed_in());
    assert_eq!(driver.typed(), vec!["ann@example.com", "hunter2"]);
}

#[tokio::test]
async fn test_login_checkpoint_is_not_retried() {
    let driver = ScriptedDriver::default().with_page(LOGIN_URL, login_page(CHECKPOINT_URL));
    let (mut crawler, _) = crawler(&driver);

    let outcome = crawler
        .login(&Credentials::new("ann@example.com", "hunter2"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LoginOutcome::CheckpointRequired {
            url: CHECKPOINT_URL.to_string()
        }
    );
    assert!(!crawler.is_signed_in());
    assert_eq!(driver.navigations().len(), 1);

    // Still pending until a human finishes it
    assert!(matches!(
        crawler.confirm_checkpoint().await.unwrap(),
        LoginOutcome::CheckpointRequired { .. }
    ));

    driver.set_current_url(FEED_URL);
    assert_eq!(crawler.confirm_checkpoint().await.unwrap(), LoginOutcome::SignedIn);
    assert!(crawler.is_signed_in());
}

#[tokio::test]
async fn test_login_without_password_fails_fast() {
    let driver = ScriptedDriver::default();
    let (mut crawler, _) = crawler(&driver);

    let result = crawler.login(&Credentials::new("ann@example.com", "")).await;

    assert!(matches!(result, Err(ShioriError::MissingCredentials)));
    assert!(driver.navigations().is_empty());
}

#[tokio::test]
async fn test_login_redirect_timeout_exhausts_retries() {
    let driver = ScriptedDriver::default()
        .with_page(LOGIN_URL, login_page("https://www.linkedin.com/login?error=1"));
    let (mut crawler, _) = crawler(&driver);

    let result = crawler
        .login(&Credentials::new("ann@example.com", "wrong"))
        .await;

    assert!(matches!(
        result,
        Err(ShioriError::Retry(RetryError::Exhausted { attempts: 3, .. }))
    ));
    assert_eq!(driver.navigations().len(), 3);
}

// ---------------------------------------------------------------------------
// Cache maintenance and shutdown
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cache_passthroughs() {
    let driver = ScriptedDriver::default()
        .with_page(JOB_URL, job_page())
        .with_page(PROFILE_URL, profile_page());
    let (mut crawler, _) = crawler(&driver);

    crawler.scrape_job(JOB_URL).await.unwrap();
    crawler.scrape_profile(PROFILE_URL).await.unwrap();

    let snapshot = crawler.export_cache().unwrap();
    assert_eq!(snapshot.total_jobs, 1);
    assert_eq!(snapshot.total_profiles, 1);

    let found = crawler
        .search_cache(RecordKind::Job, &SearchFilter::keyword("rust"))
        .unwrap();
    assert_eq!(found.len(), 1);

    let report = crawler.clear_cache(Some(0)).unwrap();
    assert_eq!(report.jobs_deleted, 1);
    assert_eq!(report.profiles_deleted, 1);

    let stats = crawler.cache_stats().unwrap();
    assert_eq!(stats.total_records(), 0);
    assert_eq!(stats.valid_jobs + stats.valid_profiles, 0);
    assert_eq!(stats.expiry_days, 7);
}

#[tokio::test]
async fn test_shutdown_closes_cache_even_if_quit_fails() {
    let driver = ScriptedDriver::default();
    driver.fail_quit(DriverError::Session("already gone".to_string()));
    let (store, closed) = TrackingStore::new(false);
    let (crawler, _) = crawler_with_store(&driver, store);

    let result = crawler.shutdown().await;

    assert!(matches!(result, Err(ShioriError::Driver(DriverError::Session(_)))));
    assert_eq!(driver.quits(), 1);
    assert!(closed.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_records_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("data").join("cache.db");
    let config = Config {
        crawler: CrawlerConfig {
            page_settle_ms: 0,
            ..CrawlerConfig::default()
        },
        ..test_config(db_path.to_str().unwrap())
    };

    let driver = ScriptedDriver::default().with_page(JOB_URL, job_page());
    let extractor = SelectorExtractor::from_config(&config.crawler);
    let mut crawler = Crawler::new(config.clone(), driver.clone(), extractor).unwrap();
    crawler.scrape_job(JOB_URL).await.unwrap().unwrap();
    crawler.shutdown().await.unwrap();

    let fresh_driver = ScriptedDriver::default();
    let extractor = SelectorExtractor::from_config(&config.crawler);
    let mut crawler = Crawler::new(config, fresh_driver.clone(), extractor).unwrap();
    let scraped = crawler.scrape_job(JOB_URL).await.unwrap().unwrap();

    assert!(scraped.from_cache());
    assert!(fresh_driver.navigations().is_empty());
}
