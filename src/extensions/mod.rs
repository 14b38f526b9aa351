pub mod builtin;
pub mod manifest;

use std::collections::HashSet;
use log::{info, warn};
use crate::model::ExtensionEntry;
use crate::transliterate::Transliterator;

pub use builtin::{BuiltinFeature, builtin_extensions};
pub use manifest::{FileManifestSource, ManifestSource, parse_manifest};

/// Built-ins merged with whatever the manifest source yields. A broken or
/// missing manifest is logged and leaves only the built-ins; built-ins win
/// on id collisions.
pub fn load_extensions(source: &dyn ManifestSource, transliterator: &Transliterator) -> Vec<ExtensionEntry> {
    let mut extensions = builtin_extensions(transliterator);

    let remote = match source.fetch().and_then(|json| parse_manifest(&json, transliterator)) {
        Ok(remote) => remote,
        Err(e) => {
            warn!("No extensions loaded from manifest: {}", e);
            return extensions;
        }
    };

    let mut seen: HashSet<String> = extensions.iter().map(|e| e.id.clone()).collect();
    let mut added = 0;
    for entry in remote {
        if !seen.insert(entry.id.clone()) {
            warn!("Ignoring duplicate extension id {:?}", entry.id);
            continue;
        }
        extensions.push(entry);
        added += 1;
    }
    info!("Loaded {} manifest extensions", added);
    extensions
}

/// Drops extensions whose required packages are not all installed.
pub fn available(extensions: Vec<ExtensionEntry>, installed: &HashSet<String>) -> Vec<ExtensionEntry> {
    extensions
        .into_iter()
        .filter(|e| e.required_packages.iter().all(|p| installed.contains(p)))
        .collect()
}
