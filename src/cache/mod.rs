//! Cache module for persisting scraped records
//!
//! This module owns everything that touches the cache database:
//! - Cache key derivation from canonical URLs
//! - SQLite schema creation for the jobs and profiles tables
//! - TTL-checked lookups and upserting writes
//! - Statistics, purging, archive search and JSON export

mod clock;
mod hash;
mod schema;
mod sqlite;
mod traits;

pub use clock::{format_timestamp, parse_timestamp, Clock, ManualClock, SystemClock};
pub use hash::cache_key;
pub use sqlite::SqliteCache;
pub use traits::{RecordStore, StoreError, StoreResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named string fields of a scraped record (title, company, location, ...)
pub type Fields = BTreeMap<String, String>;

/// The two categories of cached records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Job,
    Profile,
}

impl RecordKind {
    /// Table holding records of this kind
    pub fn table(&self) -> &'static str {
        match self {
            Self::Job => "jobs",
            Self::Profile => "profiles",
        }
    }

    /// Indexed scalar columns and the record field each one mirrors
    pub(crate) fn indexed_columns(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Job => &[
                ("title", "title"),
                ("company", "company"),
                ("location", "location"),
                ("description", "description"),
                ("posted_date", "posted_date"),
                ("job_type", "job_type"),
                ("seniority_level", "seniority_level"),
                ("job_url", "url"),
            ],
            Self::Profile => &[
                ("name", "name"),
                ("headline", "headline"),
                ("location", "location"),
                ("about", "about"),
                ("connections", "connections"),
                ("profile_url", "url"),
            ],
        }
    }

    /// Columns searched by a free-text keyword
    pub(crate) fn keyword_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Job => &["title", "description"],
            Self::Profile => &["name", "headline", "about"],
        }
    }

    /// Column searched by the company filter
    ///
    /// Profiles have no company column; the headline usually names the
    /// current employer.
    pub(crate) fn company_column(&self) -> &'static str {
        match self {
            Self::Job => "company",
            Self::Profile => "headline",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Job => write!(f, "job"),
            Self::Profile => write!(f, "profile"),
        }
    }
}

/// A scraped record as stored in the cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheRecord {
    pub key: String,
    pub kind: RecordKind,
    pub fields: Fields,
    pub scraped_at: DateTime<Utc>,
}

impl CacheRecord {
    pub fn new(key: String, kind: RecordKind, fields: Fields, scraped_at: DateTime<Utc>) -> Self {
        Self {
            key,
            kind,
            fields,
            scraped_at,
        }
    }

    /// Looks up a single field value
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Aggregate cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_jobs: u64,
    pub total_profiles: u64,
    pub expired_jobs: u64,
    pub expired_profiles: u64,
    pub valid_jobs: u64,
    pub valid_profiles: u64,
    pub storage_size_bytes: u64,
    pub expiry_days: u32,
}

impl CacheStats {
    pub fn total_records(&self) -> u64 {
        self.total_jobs + self.total_profiles
    }
}

/// Rows removed by a purge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub jobs_deleted: u64,
    pub profiles_deleted: u64,
}

/// Filters for searching cached records
///
/// Provided filters are ANDed. Matching is a case-insensitive substring
/// match for ASCII text (SQLite `LIKE`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub keyword: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub limit: u32,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            keyword: None,
            company: None,
            location: None,
            limit: 10,
        }
    }
}

impl SearchFilter {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::default()
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

/// Full snapshot of the cache, as written by the JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub exported_at: DateTime<Utc>,
    pub total_jobs: usize,
    pub total_profiles: usize,
    pub jobs: Vec<CacheRecord>,
    pub profiles: Vec<CacheRecord>,
}
