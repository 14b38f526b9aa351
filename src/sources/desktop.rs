use crate::model::InstalledPackage;
use crate::sources::Source;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use directories::BaseDirs;
use log::{info, debug};

pub struct DesktopSource {
    dirs: Vec<PathBuf>,
    locale: Option<String>,
}

impl DesktopSource {
    /// Standard XDG application dirs plus `extra`. `locale` (e.g. `zh_CN`)
    /// selects localized `Name[..]=` keys.
    pub fn new(extra: &[PathBuf], locale: Option<String>) -> Self {
        let mut dirs = Vec::new();
        if let Some(base_dirs) = BaseDirs::new() {
            dirs.push(base_dirs.data_dir().join("applications"));
        }
        dirs.push(Path::new("/usr/share/applications").to_path_buf());
        dirs.push(Path::new("/usr/local/share/applications").to_path_buf());
        dirs.extend(extra.iter().cloned());
        Self { dirs, locale }
    }

    pub fn with_dirs(dirs: Vec<PathBuf>, locale: Option<String>) -> Self {
        Self { dirs, locale }
    }
}

impl Source for DesktopSource {
    fn name(&self) -> &'static str { "desktop" }

    fn scan(&self) -> Result<Vec<InstalledPackage>> {
        let mut packages = Vec::new();

        for dir in &self.dirs {
            if !dir.exists() {
                continue;
            }
            debug!("Scanning desktop files in {:?}", dir);
            let Ok(read_dir) = fs::read_dir(dir) else { continue };
            for entry in read_dir.flatten() {
                let path = entry.path();
                if path.extension().and_then(|s| s.to_str()) != Some("desktop") {
                    continue;
                }
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue };
                if let Ok(content) = fs::read_to_string(&path) {
                    if let Some((label, exec)) = parse_desktop_file(&content, self.locale.as_deref()) {
                        packages.push(InstalledPackage {
                            label,
                            package_name: stem.to_string(),
                            command: Some(exec),
                        });
                    }
                }
            }
        }
        info!("DesktopSource: found {} entries", packages.len());
        Ok(packages)
    }
}

/// Returns `(label, exec)`; `None` for hidden or incomplete entries.
fn parse_desktop_file(content: &str, locale: Option<&str>) -> Option<(String, String)> {
    let exact_key = locale.map(|l| format!("Name[{}]", l.split('.').next().unwrap_or(l)));
    let lang_key = locale.and_then(|l| l.split(['_', '.']).next()).map(|lang| format!("Name[{lang}]"));

    let mut name = None;
    let mut exact_name = None;
    let mut lang_name = None;
    let mut exec = None;
    let mut no_display = false;
    let mut is_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }

        if line == "[Desktop Entry]" {
            is_desktop_entry = true;
            continue;
        }

        if line.starts_with('[') {
            is_desktop_entry = false;
            continue;
        }

        if !is_desktop_entry { continue; }

        let Some((key, value)) = line.split_once('=') else { continue };
        let key = key.trim();
        let value = value.trim();

        match key {
            "Name" => name = Some(value.to_string()),
            "Exec" => {
                let clean_exec: String = value
                    .split_whitespace()
                    .filter(|s| !s.starts_with('%'))
                    .collect::<Vec<_>>()
                    .join(" ");
                exec = Some(clean_exec);
            }
            "NoDisplay" | "Hidden" => no_display |= value == "true",
            _ if Some(key) == exact_key.as_deref() => exact_name = Some(value.to_string()),
            _ if Some(key) == lang_key.as_deref() => lang_name = Some(value.to_string()),
            _ => {}
        }
    }

    if no_display { return None; }

    match (exact_name.or(lang_name).or(name), exec) {
        (Some(n), Some(e)) if !e.is_empty() => Some((n, e)),
        _ => None,
    }
}
