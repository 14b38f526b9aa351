use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::params;
use log::{debug, warn};
use crate::error::{Error, Result};
use crate::model::UsageEvent;
use super::{Store, from_millis};

/// Usage is bucketed by the local calendar day of the launch.
fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

impl Store {
    pub fn record_launch(&mut self, key: &str) -> Result<()> {
        self.record_launch_at(key, Utc::now())
    }

    /// Bumps the priority of the app or extension behind `key` and appends a
    /// usage event, atomically.
    pub fn record_launch_at(&mut self, key: &str, ts: DateTime<Utc>) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut updated = tx.execute(
            "UPDATE apps SET priority = priority + 1 WHERE package_name = ?1",
            params![key],
        )?;
        if updated == 0 {
            updated = tx.execute(
                "UPDATE extension_cache SET priority = priority + 1 WHERE id = ?1",
                params![key],
            )?;
        }
        if updated == 0 {
            return Err(Error::NotFound(key.to_string()));
        }

        tx.execute(
            "INSERT INTO usage (key, timestamp, day) VALUES (?1, ?2, ?3)",
            params![key, ts.timestamp_millis(), local_day(ts).to_string()],
        )?;
        tx.commit()?;
        debug!("Recorded launch of {}", key);
        Ok(())
    }

    pub fn usage_count(&self, key: &str) -> Result<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM usage WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn usage_events(&self, key: &str) -> Result<Vec<UsageEvent>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, timestamp FROM usage WHERE key = ?1 ORDER BY timestamp")?;
        let events = stmt
            .query_map(params![key], |row| {
                Ok(UsageEvent {
                    key: row.get(0)?,
                    timestamp: from_millis(row.get(1)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    /// Launch count per local day, oldest first.
    pub fn daily_counts(&self) -> Result<Vec<(NaiveDate, u32)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT day, COUNT(*) FROM usage GROUP BY day ORDER BY day")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut counts = Vec::with_capacity(rows.len());
        for (day, count) in rows {
            match day.parse::<NaiveDate>() {
                Ok(date) => counts.push((date, count)),
                Err(e) => warn!("Skipping usage bucket with bad day {:?}: {}", day, e),
            }
        }
        Ok(counts)
    }

    /// Keys launched on `day` with their counts, most used first.
    pub fn keys_used_on(&self, day: NaiveDate) -> Result<Vec<(String, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT key, COUNT(*) AS n FROM usage WHERE day = ?1 GROUP BY key ORDER BY n DESC, key",
        )?;
        let keys = stmt
            .query_map(params![day.to_string()], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }
}
