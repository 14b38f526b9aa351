use rusqlite::params;
use rusqlite::types::Type;
use std::collections::HashSet;
use log::{info, warn};
use crate::error::Result;
use crate::model::{ExtensionEntry, ExtensionKind};
use super::{Store, json_list};

fn extension_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExtensionEntry> {
    let kind: String = row.get(3)?;
    let kind = kind
        .parse::<ExtensionKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
    Ok(ExtensionEntry {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        kind,
        invocation: row.get(4)?,
        keywords: json_list(row, 5)?,
        required_packages: json_list(row, 6)?,
        priority: row.get(7)?,
        abbreviation: row.get(8)?,
        search_target: row.get(9)?,
    })
}

impl Store {
    /// Caches the merged extension list. Stored priorities are kept and new
    /// rows start from their usage count. An extension whose id is already an
    /// app package is skipped, so every launch key names one entity.
    pub fn replace_extensions(&mut self, entries: &[ExtensionEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        let mut stored = 0;
        {
            let mut is_app = tx.prepare("SELECT 1 FROM apps WHERE package_name = ?1")?;
            let mut upsert = tx.prepare(
                "INSERT INTO extension_cache
                     (id, name, description, kind, invocation, keywords, required_packages,
                      priority, abbreviation, search_target)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7,
                         (SELECT COUNT(*) FROM usage WHERE key = ?1), ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     description = excluded.description,
                     kind = excluded.kind,
                     invocation = excluded.invocation,
                     keywords = excluded.keywords,
                     required_packages = excluded.required_packages,
                     abbreviation = excluded.abbreviation,
                     search_target = excluded.search_target",
            )?;
            for entry in entries {
                if is_app.exists(params![entry.id])? {
                    warn!("Store: extension '{}' collides with an app package, skipped", entry.id);
                    continue;
                }
                stored += 1;
                upsert.execute(params![
                    entry.id,
                    entry.name,
                    entry.description,
                    entry.kind.as_str(),
                    entry.invocation,
                    serde_json::to_string(&entry.keywords)?,
                    serde_json::to_string(&entry.required_packages)?,
                    entry.abbreviation,
                    entry.search_target,
                ])?;
            }
        }

        let keep: HashSet<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        let existing: Vec<String> = {
            let mut stmt = tx.prepare("SELECT id FROM extension_cache")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };
        for id in existing.iter().filter(|id| !keep.contains(id.as_str())) {
            tx.execute("DELETE FROM extension_cache WHERE id = ?1", params![id])?;
        }
        tx.commit()?;

        info!("Store: {} extensions cached", stored);
        Ok(())
    }

    pub fn list_extensions(&self) -> Result<Vec<ExtensionEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, kind, invocation, keywords, required_packages,
                    priority, abbreviation, search_target
             FROM extension_cache ORDER BY priority DESC, name",
        )?;
        let extensions = stmt
            .query_map([], extension_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(extensions)
    }
}
