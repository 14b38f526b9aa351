use crate::error;
use crate::model::{AppEntry, InstalledPackage};
use crate::store::Store;
use crate::transliterate::Transliterator;
use anyhow::Result;
use log::{info, warn};
use std::collections::HashSet;

pub trait Source {
    fn name(&self) -> &'static str;
    fn scan(&self) -> Result<Vec<InstalledPackage>>;
}

pub mod desktop;
pub mod fixed;

/// Full rescan: every source is scanned, labels are re-transliterated and the
/// app table is replaced. A failing source is skipped; the first source to
/// report a package wins. Returns the stored apps with their priorities.
pub fn rescan(
    sources: &[Box<dyn Source + Send>],
    store: &mut Store,
    transliterator: &Transliterator,
) -> error::Result<Vec<AppEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for source in sources {
        match source.scan() {
            Ok(packages) => {
                for pkg in packages {
                    if seen.insert(pkg.package_name.clone()) {
                        entries.push(AppEntry::from_package(pkg, transliterator));
                    }
                }
            }
            Err(e) => warn!("{} scan failed: {:#}", source.name(), e),
        }
    }

    info!("Rescan: {} apps from {} sources", entries.len(), sources.len());
    store.replace_apps(&entries)?;
    store.list_apps()
}
