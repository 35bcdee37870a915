//! SQLite cache implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::cache::clock::{format_timestamp, parse_timestamp, Clock, SystemClock};
use crate::cache::schema::initialize_schema;
use crate::cache::traits::{RecordStore, StoreResult};
use crate::cache::{
    CacheRecord, CacheStats, ClearReport, ExportSnapshot, Fields, RecordKind, SearchFilter,
};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

/// SQLite cache backend
pub struct SqliteCache {
    conn: Connection,
    expiry_days: u32,
    clock: Arc<dyn Clock>,
}

impl SqliteCache {
    /// Opens or creates a cache database
    ///
    /// Missing parent directories are created, and the tables and indices
    /// are created if absent.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `expiry_days` - Age after which a record is treated as a miss
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteCache)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn open(path: &Path, expiry_days: u32) -> StoreResult<Self> {
        Self::open_with_clock(path, expiry_days, Arc::new(SystemClock))
    }

    /// Opens or creates a cache database that reads time from `clock`
    pub fn open_with_clock(
        path: &Path,
        expiry_days: u32,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        tracing::info!("Cache database initialized at {}", path.display());

        Ok(Self {
            conn,
            expiry_days,
            clock,
        })
    }

    /// Creates an in-memory cache (for tests and dry runs)
    pub fn open_in_memory(expiry_days: u32, clock: Arc<dyn Clock>) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            expiry_days,
            clock,
        })
    }

    pub fn expiry_days(&self) -> u32 {
        self.expiry_days
    }

    /// Timestamp `days` days before now
    ///
    /// `None` when that instant lies before the earliest representable
    /// date, in which case no stored record is that old.
    fn days_ago(&self, days: u32) -> Option<String> {
        Duration::try_days(i64::from(days))
            .and_then(|window| self.clock.now().checked_sub_signed(window))
            .map(format_timestamp)
    }

    fn write_record(
        &mut self,
        kind: RecordKind,
        key: &str,
        fields: &Fields,
        scraped_at: &str,
    ) -> StoreResult<()> {
        let data_json = serde_json::to_string(fields)?;

        let mut values: Vec<Option<&str>> = vec![Some(key)];
        values.extend(
            kind.indexed_columns()
                .iter()
                .map(|(_, field)| fields.get(*field).map(String::as_str)),
        );
        values.push(Some(scraped_at));
        values.push(Some(&data_json));

        // Dropping the transaction without commit rolls it back.
        let tx = self.conn.transaction()?;
        tx.execute(&upsert_sql(kind), params_from_iter(values.iter()))?;
        tx.commit()?;

        Ok(())
    }

    fn delete_records(&mut self, cutoff: Option<&str>) -> StoreResult<ClearReport> {
        let tx = self.conn.transaction()?;

        let (jobs_deleted, profiles_deleted) = match cutoff {
            None => (
                tx.execute("DELETE FROM jobs", [])?,
                tx.execute("DELETE FROM profiles", [])?,
            ),
            Some(cutoff) => (
                tx.execute("DELETE FROM jobs WHERE scraped_at <= ?1", params![cutoff])?,
                tx.execute("DELETE FROM profiles WHERE scraped_at <= ?1", params![cutoff])?,
            ),
        };

        tx.commit()?;

        // Reclaim the freed pages
        self.conn.execute_batch("VACUUM")?;

        Ok(ClearReport {
            jobs_deleted: jobs_deleted as u64,
            profiles_deleted: profiles_deleted as u64,
        })
    }

    fn count(&self, kind: RecordKind, expired_before: Option<&str>) -> StoreResult<u64> {
        let count: i64 = match expired_before {
            None => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", kind.table()),
                [],
                |row| row.get(0),
            )?,
            Some(cutoff) => self.conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE scraped_at < ?1", kind.table()),
                params![cutoff],
                |row| row.get(0),
            )?,
        };
        Ok(count as u64)
    }

    fn storage_size(&self) -> StoreResult<u64> {
        let size: i64 = self.conn.query_row(
            "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
            [],
            |row| row.get(0),
        )?;
        Ok(size as u64)
    }

    fn load_all(&self, kind: RecordKind) -> StoreResult<Vec<CacheRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT cache_key, data_json, scraped_at FROM {} ORDER BY id",
            kind.table()
        ))?;

        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
            .collect::<Result<Vec<(String, String, String)>, _>>()?;

        rows.into_iter()
            .map(|(key, data_json, scraped_at)| decode_record(kind, key, &data_json, &scraped_at))
            .collect()
    }
}

impl RecordStore for SqliteCache {
    fn get(&self, kind: RecordKind, key: &str) -> StoreResult<Option<CacheRecord>> {
        // An empty cutoff sorts before every stored timestamp
        let cutoff = self.days_ago(self.expiry_days).unwrap_or_default();

        let row: Option<(String, String)> = self
            .conn
            .query_row(
                &format!(
                    "SELECT data_json, scraped_at FROM {} WHERE cache_key = ?1 AND scraped_at >= ?2",
                    kind.table()
                ),
                params![key, cutoff],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((data_json, scraped_at)) => {
                tracing::debug!("Cache hit for {} key: {}", kind, key);
                decode_record(kind, key.to_string(), &data_json, &scraped_at).map(Some)
            }
            None => {
                tracing::debug!("Cache miss for {} key: {}", kind, key);
                Ok(None)
            }
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    fn put(&mut self, kind: RecordKind, key: &str, fields: &Fields) -> StoreResult<CacheRecord> {
        let scraped_at = self.now();

        match self.write_record(kind, key, fields, &format_timestamp(scraped_at)) {
            Ok(()) => {
                tracing::debug!("{} data cached with key: {}", kind, key);
                Ok(CacheRecord::new(key.to_string(), kind, fields.clone(), scraped_at))
            }
            Err(e) => {
                tracing::error!("Failed to save {} to cache: {}", kind, e);
                Err(e)
            }
        }
    }

    fn stats(&self) -> StoreResult<CacheStats> {
        let total_jobs = self.count(RecordKind::Job, None)?;
        let total_profiles = self.count(RecordKind::Profile, None)?;
        let (expired_jobs, expired_profiles) = match self.days_ago(self.expiry_days) {
            Some(cutoff) => (
                self.count(RecordKind::Job, Some(&cutoff))?,
                self.count(RecordKind::Profile, Some(&cutoff))?,
            ),
            None => (0, 0),
        };

        Ok(CacheStats {
            total_jobs,
            total_profiles,
            expired_jobs,
            expired_profiles,
            valid_jobs: total_jobs - expired_jobs,
            valid_profiles: total_profiles - expired_profiles,
            storage_size_bytes: self.storage_size()?,
            expiry_days: self.expiry_days,
        })
    }

    fn clear(&mut self, older_than_days: Option<u32>) -> StoreResult<ClearReport> {
        let result = match older_than_days {
            None => self.delete_records(None),
            Some(days) => match self.days_ago(days) {
                Some(cutoff) => self.delete_records(Some(&cutoff)),
                None => Ok(ClearReport::default()),
            },
        };

        match result {
            Ok(report) => {
                match older_than_days {
                    None => tracing::info!("All cache cleared"),
                    Some(days) => tracing::info!(
                        "Cleared {} jobs and {} profiles older than {} days",
                        report.jobs_deleted,
                        report.profiles_deleted,
                        days
                    ),
                }
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Failed to clear cache: {}", e);
                Err(e)
            }
        }
    }

    fn search(&self, kind: RecordKind, filter: &SearchFilter) -> StoreResult<Vec<CacheRecord>> {
        let mut sql = format!(
            "SELECT cache_key, data_json, scraped_at FROM {} WHERE 1=1",
            kind.table()
        );
        let mut values: Vec<String> = Vec::new();

        if let Some(keyword) = non_empty(&filter.keyword) {
            let pattern = like_pattern(keyword);
            let clauses: Vec<String> = kind
                .keyword_columns()
                .iter()
                .map(|column| {
                    values.push(pattern.clone());
                    format!("{} LIKE ? ESCAPE '\\'", column)
                })
                .collect();
            sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
        }

        if let Some(company) = non_empty(&filter.company) {
            sql.push_str(&format!(" AND {} LIKE ? ESCAPE '\\'", kind.company_column()));
            values.push(like_pattern(company));
        }

        if let Some(location) = non_empty(&filter.location) {
            sql.push_str(" AND location LIKE ? ESCAPE '\\'");
            values.push(like_pattern(location));
        }

        sql.push_str(&format!(" ORDER BY scraped_at DESC, id DESC LIMIT {}", filter.limit));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<(String, String, String)>, _>>()?;

        rows.into_iter()
            .map(|(key, data_json, scraped_at)| decode_record(kind, key, &data_json, &scraped_at))
            .collect()
    }

    fn export_all(&self) -> StoreResult<ExportSnapshot> {
        let jobs = self.load_all(RecordKind::Job)?;
        let profiles = self.load_all(RecordKind::Profile)?;

        Ok(ExportSnapshot {
            exported_at: self.clock.now(),
            total_jobs: jobs.len(),
            total_profiles: profiles.len(),
            jobs,
            profiles,
        })
    }

    fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        tracing::info!("Cache database connection closed");
        Ok(())
    }
}

/// Builds the upsert statement for a kind's table
fn upsert_sql(kind: RecordKind) -> String {
    let columns: Vec<&str> = kind.indexed_columns().iter().map(|(c, _)| *c).collect();
    let placeholders: Vec<String> = (1..=columns.len() + 3).map(|i| format!("?{}", i)).collect();
    let updates: Vec<String> = columns
        .iter()
        .chain(["scraped_at", "data_json"].iter())
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();

    format!(
        "INSERT INTO {} (cache_key, {}, scraped_at, data_json) VALUES ({})
         ON CONFLICT(cache_key) DO UPDATE SET {}",
        kind.table(),
        columns.join(", "),
        placeholders.join(", "),
        updates.join(", ")
    )
}

fn decode_record(
    kind: RecordKind,
    key: String,
    data_json: &str,
    scraped_at: &str,
) -> StoreResult<CacheRecord> {
    let fields: Fields = serde_json::from_str(data_json)?;
    Ok(CacheRecord::new(key, kind, fields, parse_timestamp(scraped_at)?))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Wraps user text for a substring LIKE, escaping its wildcards
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
