use crate::config::StaticEntry;
use crate::model::InstalledPackage;
use crate::sources::Source;
use anyhow::Result;

/// Entries declared in the config under `[[sources.items]]`.
pub struct StaticSource {
    items: Vec<StaticEntry>,
}

impl StaticSource {
    pub fn new(items: Vec<StaticEntry>) -> Self {
        Self { items }
    }
}

impl Source for StaticSource {
    fn name(&self) -> &'static str { "static" }

    fn scan(&self) -> Result<Vec<InstalledPackage>> {
        Ok(self
            .items
            .iter()
            .map(|item| InstalledPackage {
                label: item.name.clone(),
                package_name: item.package.clone(),
                command: item.command.clone(),
            })
            .collect())
    }
}
