//! Cache store trait and error types
//!
//! This module defines the trait interface for cache backends and
//! associated error types.

use crate::cache::{CacheRecord, CacheStats, ClearReport, ExportSnapshot, Fields, RecordKind, SearchFilter};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp {0}")]
    InvalidTimestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cache operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for cache backend implementations
///
/// A store owns every cached record. Reads never mutate state; writes are
/// durable once they return `Ok`. A write that fails is rolled back and
/// reported through `Err`, leaving the previous record (if any) intact.
pub trait RecordStore {
    /// Returns the record for `key` if it is within the expiry window
    fn get(&self, kind: RecordKind, key: &str) -> StoreResult<Option<CacheRecord>>;

    /// Current time as this store stamps records
    fn now(&self) -> DateTime<Utc>;

    /// Inserts or replaces the record for `key`, stamped with the current time
    ///
    /// # Returns
    ///
    /// The record exactly as it was stored
    fn put(&mut self, kind: RecordKind, key: &str, fields: &Fields) -> StoreResult<CacheRecord>;

    /// Counts records, split by validity at call time
    fn stats(&self) -> StoreResult<CacheStats>;

    /// Deletes every record, or only those older than `older_than_days`
    fn clear(&mut self, older_than_days: Option<u32>) -> StoreResult<ClearReport>;

    /// Searches the archive, newest first
    fn search(&self, kind: RecordKind, filter: &SearchFilter) -> StoreResult<Vec<CacheRecord>>;

    /// Snapshots every record of both kinds
    fn export_all(&self) -> StoreResult<ExportSnapshot>;

    /// Flushes and releases the backing storage
    fn close(self) -> StoreResult<()>
    where
        Self: Sized;
}
