use rusqlite::{OptionalExtension, params};
use std::collections::HashSet;
use log::{info, warn};
use crate::error::Result;
use crate::model::AppEntry;
use super::Store;

const APP_COLUMNS: &str = "package_name, label, abbreviation, search_target, priority, command";

fn app_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppEntry> {
    Ok(AppEntry {
        package_name: row.get(0)?,
        label: row.get(1)?,
        abbreviation: row.get(2)?,
        search_target: row.get(3)?,
        priority: row.get(4)?,
        command: row.get(5)?,
    })
}

impl Store {
    /// Swaps in the result of a full rescan. Priorities survive for packages
    /// that are still installed. A package that comes back after being
    /// dropped starts from its usage count, so priority always equals the
    /// number of recorded launches. Apps own their key: a cached extension
    /// with the same id is evicted.
    pub fn replace_apps(&mut self, entries: &[AppEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut evicted = 0;
        {
            let mut upsert = tx.prepare(
                "INSERT INTO apps (package_name, label, abbreviation, search_target, priority, command)
                 VALUES (?1, ?2, ?3, ?4, (SELECT COUNT(*) FROM usage WHERE key = ?1), ?5)
                 ON CONFLICT(package_name) DO UPDATE SET
                     label = excluded.label,
                     abbreviation = excluded.abbreviation,
                     search_target = excluded.search_target,
                     command = excluded.command",
            )?;
            for entry in entries {
                upsert.execute(params![
                    entry.package_name,
                    entry.label,
                    entry.abbreviation,
                    entry.search_target,
                    entry.command,
                ])?;
            }
            let mut evict = tx.prepare("DELETE FROM extension_cache WHERE id = ?1")?;
            for entry in entries {
                evicted += evict.execute(params![entry.package_name])?;
            }
        }
        if evicted > 0 {
            warn!("Store: {} cached extensions shadowed by app packages", evicted);
        }

        let keep: HashSet<&str> = entries.iter().map(|e| e.package_name.as_str()).collect();
        let existing: Vec<String> = {
            let mut stmt = tx.prepare("SELECT package_name FROM apps")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };
        let mut removed = 0;
        for package in existing.iter().filter(|p| !keep.contains(p.as_str())) {
            removed += tx.execute("DELETE FROM apps WHERE package_name = ?1", params![package])?;
        }
        tx.commit()?;

        info!("Store: {} apps stored, {} removed", entries.len(), removed);
        Ok(())
    }

    pub fn list_apps(&self) -> Result<Vec<AppEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {APP_COLUMNS} FROM apps ORDER BY priority DESC, label"
        ))?;
        let apps = stmt
            .query_map([], app_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(apps)
    }

    pub fn get_app(&self, package_name: &str) -> Result<Option<AppEntry>> {
        let app = self
            .conn
            .query_row(
                &format!("SELECT {APP_COLUMNS} FROM apps WHERE package_name = ?1"),
                params![package_name],
                app_from_row,
            )
            .optional()?;
        Ok(app)
    }
}
