//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Shiori cache.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Cached job postings
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cache_key TEXT NOT NULL UNIQUE,
    title TEXT,
    company TEXT,
    location TEXT,
    description TEXT,
    posted_date TEXT,
    job_type TEXT,
    seniority_level TEXT,
    job_url TEXT,
    scraped_at TEXT NOT NULL,
    data_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_jobs_cache_key ON jobs(cache_key);
CREATE INDEX IF NOT EXISTS idx_jobs_scraped_at ON jobs(scraped_at);

-- Cached member profiles
CREATE TABLE IF NOT EXISTS profiles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cache_key TEXT NOT NULL UNIQUE,
    name TEXT,
    headline TEXT,
    location TEXT,
    about TEXT,
    connections TEXT,
    profile_url TEXT,
    scraped_at TEXT NOT NULL,
    data_json TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_profiles_cache_key ON profiles(cache_key);
CREATE INDEX IF NOT EXISTS idx_profiles_scraped_at ON profiles(scraped_at);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
