//! URL handling module for Shiori
//!
//! This module provides canonicalization of resource URLs, search URL
//! construction, and helpers for recognising job and profile links.

mod canonical;

use crate::cache::RecordKind;
use crate::config::SiteConfig;
use crate::UrlError;
use url::Url;

// Re-export main functions
pub use canonical::canonical_url;

/// Builds the job search listing URL for a query
///
/// `keywords` and `location` are sent as URL-encoded query parameters on
/// the configured search path.
///
/// # Examples
///
/// ```
/// use shiori::config::SiteConfig;
/// use shiori::url::build_search_url;
///
/// let site = SiteConfig {
///     base_url: "https://jobs.example.com".to_string(),
///     ..SiteConfig::default()
/// };
/// let url = build_search_url(&site, "Rust Developer", "Berlin").unwrap();
/// assert_eq!(
///     url,
///     "https://jobs.example.com/jobs/search/?keywords=Rust+Developer&location=Berlin"
/// );
/// ```
pub fn build_search_url(
    site: &SiteConfig,
    keywords: &str,
    location: &str,
) -> Result<String, UrlError> {
    let mut url = site_url(site, &site.job_search_path)?;
    url.query_pairs_mut()
        .append_pair("keywords", keywords.trim())
        .append_pair("location", location.trim());
    Ok(url.to_string())
}

/// Resolves a site-relative path against the configured base URL
pub fn site_url(site: &SiteConfig, path: &str) -> Result<Url, UrlError> {
    let base = Url::parse(&site.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    base.join(path)
        .map_err(|e| UrlError::Malformed(format!("Cannot join '{}': {}", path, e)))
}

/// Checks whether a URL points at a resource of the given kind
pub fn is_resource_url(site: &SiteConfig, url: &str, kind: RecordKind) -> bool {
    let marker = match kind {
        RecordKind::Job => &site.job_link_marker,
        RecordKind::Profile => &site.profile_link_marker,
    };
    url.contains(marker.as_str())
}

/// Extracts the resource identifier that follows the kind's link marker
///
/// Returns `None` if the marker is absent or nothing follows it.
///
/// # Examples
///
/// ```
/// use shiori::cache::RecordKind;
/// use shiori::config::SiteConfig;
/// use shiori::url::resource_id;
///
/// let site = SiteConfig::default();
/// let id = resource_id(&site, "https://www.linkedin.com/jobs/view/3791/?x=1", RecordKind::Job);
/// assert_eq!(id.as_deref(), Some("3791"));
/// ```
pub fn resource_id(site: &SiteConfig, url: &str, kind: RecordKind) -> Option<String> {
    let marker = match kind {
        RecordKind::Job => &site.job_link_marker,
        RecordKind::Profile => &site.profile_link_marker,
    };

    let (_, rest) = url.split_once(marker.as_str())?;
    let id = rest
        .split(['/', '?', '#'])
        .next()
        .filter(|segment| !segment.is_empty())?;

    Some(id.to_string())
}
