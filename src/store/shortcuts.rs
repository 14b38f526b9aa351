use chrono::Utc;
use rusqlite::params;
use std::collections::HashSet;
use crate::error::Result;
use crate::model::{HiddenEntry, StarShortcut};
use super::{Store, from_millis};

impl Store {
    /// One keyword per key; starring an entity again replaces its keyword.
    pub fn insert_star(&self, key: &str, keyword: &str) -> Result<StarShortcut> {
        let star = StarShortcut {
            key: key.to_string(),
            keyword: keyword.trim().to_string(),
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO star (key, keyword, created_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET keyword = excluded.keyword, created_at = excluded.created_at",
            params![star.key, star.keyword, star.created_at.timestamp_millis()],
        )?;
        Ok(star)
    }

    pub fn delete_star(&self, star: &StarShortcut) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM star WHERE key = ?1", params![star.key])?;
        Ok(n > 0)
    }

    pub fn list_stars(&self) -> Result<Vec<StarShortcut>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, keyword, created_at FROM star ORDER BY created_at, key")?;
        let stars = stmt
            .query_map([], |row| {
                Ok(StarShortcut {
                    key: row.get(0)?,
                    keyword: row.get(1)?,
                    created_at: from_millis(row.get(2)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stars)
    }

    /// Hiding twice keeps the original timestamp.
    pub fn insert_hidden(&self, key: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO hidden (key, created_at) VALUES (?1, ?2) ON CONFLICT(key) DO NOTHING",
            params![key, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    pub fn delete_hidden(&self, key: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM hidden WHERE key = ?1", params![key])?;
        Ok(n > 0)
    }

    pub fn list_hidden(&self) -> Result<Vec<HiddenEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, created_at FROM hidden ORDER BY created_at, key")?;
        let hidden = stmt
            .query_map([], |row| {
                Ok(HiddenEntry {
                    key: row.get(0)?,
                    created_at: from_millis(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(hidden)
    }

    pub fn hidden_keys(&self) -> Result<HashSet<String>> {
        Ok(self.list_hidden()?.into_iter().map(|h| h.key).collect())
    }
}
