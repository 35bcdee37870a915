use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Shiori
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

/// Retry, wait and pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of attempts per driver operation
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Multiplier applied to the delay after each failed attempt
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// How long to wait for an element to appear (seconds)
    #[serde(rename = "wait-timeout-secs", default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Pause after navigation so dynamic content can render (milliseconds)
    #[serde(rename = "page-settle-ms", default = "default_page_settle_ms")]
    pub page_settle_ms: u64,

    /// Number of scroll-to-bottom passes on search listings
    #[serde(rename = "scroll-passes", default = "default_scroll_passes")]
    pub scroll_passes: u32,

    /// Poll interval while waiting for the login redirect (milliseconds)
    #[serde(rename = "url-poll-interval-ms", default = "default_url_poll_interval_ms")]
    pub url_poll_interval_ms: u64,
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }

    pub fn url_poll_interval(&self) -> Duration {
        Duration::from_millis(self.url_poll_interval_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            backoff_factor: default_backoff_factor(),
            wait_timeout_secs: default_wait_timeout_secs(),
            page_settle_ms: default_page_settle_ms(),
            scroll_passes: default_scroll_passes(),
            url_poll_interval_ms: default_url_poll_interval_ms(),
        }
    }
}

/// Cache storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Days before a cached record is treated as a miss
    #[serde(rename = "expiry-days", default = "default_expiry_days")]
    pub expiry_days: u32,
}

/// Site layout: where things live on the target application
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    #[serde(rename = "login-path", default = "default_login_path")]
    pub login_path: String,

    #[serde(rename = "job-search-path", default = "default_job_search_path")]
    pub job_search_path: String,

    /// Path fragment that identifies a job posting link
    #[serde(rename = "job-link-marker", default = "default_job_link_marker")]
    pub job_link_marker: String,

    /// Path fragment that identifies a profile link
    #[serde(rename = "profile-link-marker", default = "default_profile_link_marker")]
    pub profile_link_marker: String,

    /// URL fragment shown while the site demands human verification
    #[serde(rename = "checkpoint-marker", default = "default_checkpoint_marker")]
    pub checkpoint_marker: String,

    /// URL fragment shown once the session is signed in
    #[serde(rename = "signed-in-marker", default = "default_signed_in_marker")]
    pub signed_in_marker: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_path: default_login_path(),
            job_search_path: default_job_search_path(),
            job_link_marker: default_job_link_marker(),
            profile_link_marker: default_profile_link_marker(),
            checkpoint_marker: default_checkpoint_marker(),
            signed_in_marker: default_signed_in_marker(),
        }
    }
}

/// Account used for the login flow
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both email and password are present
    pub fn is_complete(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

// Keep the password out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_wait_timeout_secs() -> u64 {
    10
}

fn default_page_settle_ms() -> u64 {
    3000
}

fn default_scroll_passes() -> u32 {
    3
}

fn default_url_poll_interval_ms() -> u64 {
    500
}

fn default_expiry_days() -> u32 {
    7
}

fn default_base_url() -> String {
    "https://www.linkedin.com".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_job_search_path() -> String {
    "/jobs/search/".to_string()
}

fn default_job_link_marker() -> String {
    "/jobs/view/".to_string()
}

fn default_profile_link_marker() -> String {
    "/in/".to_string()
}

fn default_checkpoint_marker() -> String {
    "checkpoint".to_string()
}

fn default_signed_in_marker() -> String {
    "feed".to_string()
}
