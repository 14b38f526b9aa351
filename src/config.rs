use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use crate::error::Result;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub transliteration: TransliterationConfig,
    #[serde(default)]
    pub sources: SourceConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,
    #[serde(default = "default_opener")]
    pub opener: String,
    #[serde(default = "default_intent_command")]
    pub intent_command: String,
    /// Used for apps that carry no command of their own. `{package}` is substituted.
    #[serde(default = "default_launch_command")]
    pub launch_command: String,
}

fn default_opener() -> String { "xdg-open".to_string() }
fn default_intent_command() -> String { "am start -a".to_string() }
fn default_launch_command() -> String {
    "monkey -p {package} -c android.intent.category.LAUNCHER 1".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            manifest_path: None,
            opener: default_opener(),
            intent_command: default_intent_command(),
            launch_command: default_launch_command(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SearchConfig {
    #[serde(default)]
    pub fuzzy: bool,
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: u32,
    /// Regex patterns; matching labels or keys never show up in results.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_fuzzy_threshold() -> u32 { crate::search::DEFAULT_FUZZY_THRESHOLD }
fn default_limit() -> usize { 50 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy: false,
            fuzzy_threshold: default_fuzzy_threshold(),
            exclude: Vec::new(),
            limit: default_limit(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DominantHand {
    Left,
    #[default]
    Right,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionDisplay {
    #[default]
    Inline,
    Separate,
    Hidden,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub auto_focus: bool,
    #[serde(default)]
    pub show_usage_count: bool,
    #[serde(default)]
    pub embedded_keyboard: bool,
    #[serde(default)]
    pub dominant_hand: DominantHand,
    #[serde(default)]
    pub extension_display: ExtensionDisplay,
}

fn default_true() -> bool { true }

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_focus: true,
            show_usage_count: false,
            embedded_keyboard: false,
            dominant_hand: DominantHand::default(),
            extension_display: ExtensionDisplay::default(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct TransliterationConfig {
    /// Word -> space separated syllables, e.g. `"音乐" = "YIN YUE"`.
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_true")]
    pub scan_desktop: bool,
    #[serde(default)]
    pub desktop_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub items: Vec<StaticEntry>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            scan_desktop: true,
            desktop_dirs: Vec::new(),
            items: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct StaticEntry {
    pub name: String,
    pub package: String,
    #[serde(default)]
    pub command: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "leap", "leap")
}

impl Config {
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.general.db_path {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => {
                let data_dir = dirs.data_dir();
                let _ = fs::create_dir_all(data_dir);
                data_dir.join("leap.db")
            }
            None => PathBuf::from("leap.db"),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        if let Some(path) = &self.general.manifest_path {
            return path.clone();
        }
        match project_dirs() {
            Some(dirs) => dirs.config_dir().join("extensions.json"),
            None => PathBuf::from("extensions.json"),
        }
    }
}

pub fn load_config() -> Result<Config> {
    let config_path = if let Some(dirs) = &project_dirs() {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    };
    load_config_from(&config_path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("nope.toml")).unwrap();
        assert!(!config.search.fuzzy);
        assert_eq!(config.search.fuzzy_threshold, 80);
        assert!(config.ui.auto_focus);
        assert_eq!(config.ui.dominant_hand, DominantHand::Right);
        assert_eq!(config.general.opener, "xdg-open");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[search]
fuzzy = true
exclude = ["^com\\.android\\."]

[ui]
dominant_hand = "left"
extension_display = "separate"

[transliteration.overrides]
"长安" = "CHANG AN"

[[sources.items]]
name = "Terminal"
package = "org.term"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert!(config.search.fuzzy);
        assert_eq!(config.search.fuzzy_threshold, 80);
        assert_eq!(config.search.exclude.len(), 1);
        assert_eq!(config.ui.dominant_hand, DominantHand::Left);
        assert_eq!(config.ui.extension_display, ExtensionDisplay::Separate);
        assert_eq!(config.transliteration.overrides["长安"], "CHANG AN");
        assert_eq!(config.sources.items[0].package, "org.term");
        assert!(config.sources.items[0].command.is_none());
        assert!(config.sources.scan_desktop);
    }

    #[test]
    fn explicit_paths_win() {
        let mut config = Config::default();
        config.general.db_path = Some(PathBuf::from("/tmp/x.db"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/x.db"));
    }
}
