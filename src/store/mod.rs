//! SQLite persistence: installed apps, usage events, star shortcuts,
//! hidden entries and the extension cache.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rusqlite::types::Type;
use std::path::Path;
use log::info;
use crate::error::Result;

mod apps;
mod extensions;
mod shortcuts;
mod usage;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS apps (
    package_name  TEXT PRIMARY KEY,
    label         TEXT NOT NULL,
    abbreviation  TEXT NOT NULL,
    search_target TEXT NOT NULL,
    priority      INTEGER NOT NULL DEFAULT 0,
    command       TEXT
);
CREATE TABLE IF NOT EXISTS usage (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    key       TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    day       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS usage_by_day ON usage(day);
CREATE INDEX IF NOT EXISTS usage_by_key ON usage(key);
CREATE TABLE IF NOT EXISTS star (
    key        TEXT PRIMARY KEY,
    keyword    TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS hidden (
    key        TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS extension_cache (
    id                TEXT PRIMARY KEY,
    name              TEXT NOT NULL,
    description       TEXT NOT NULL,
    kind              TEXT NOT NULL,
    invocation        TEXT NOT NULL,
    keywords          TEXT NOT NULL,
    required_packages TEXT NOT NULL,
    priority          INTEGER NOT NULL DEFAULT 0,
    abbreviation      TEXT NOT NULL,
    search_target     TEXT NOT NULL
);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening store at {:?}", path);
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Decodes a JSON string-list column.
fn json_list(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
