//! Extension manifest parsing.
//!
//! A manifest is a JSON list of records, either bare or wrapped as
//! `{"extensions": [...]}`:
//!
//! ```json
//! [{"name": "Alipay Scan", "description": "...", "type": "scheme",
//!   "invocation": "alipays://platformapi/startapp?saId=10000007",
//!   "keywords": ["pay"], "requiredPackages": ["com.eg.android.AlipayGphone"]}]
//! ```

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use crate::error::{Error, Result};
use crate::model::{ExtensionEntry, ExtensionKind};
use crate::transliterate::Transliterator;

/// Where the manifest text comes from.
pub trait ManifestSource {
    fn fetch(&self) -> Result<String>;
}

pub struct FileManifestSource {
    path: PathBuf,
}

impl FileManifestSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ManifestSource for FileManifestSource {
    fn fetch(&self) -> Result<String> {
        Ok(fs::read_to_string(&self.path)?)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ManifestRecord {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type")]
    kind: ExtensionKind,
    #[serde(alias = "data")]
    invocation: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    required_packages: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestDoc {
    List(Vec<ManifestRecord>),
    Wrapped { extensions: Vec<ManifestRecord> },
}

/// `"Alipay Scan!"` -> `"alipay-scan"`.
fn slug(name: &str) -> String {
    let mut out = String::new();
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

pub fn parse_manifest(json: &str, transliterator: &Transliterator) -> Result<Vec<ExtensionEntry>> {
    let records = match serde_json::from_str(json)? {
        ManifestDoc::List(records) => records,
        ManifestDoc::Wrapped { extensions } => extensions,
    };

    records
        .into_iter()
        .map(|record| {
            let name = record.name.trim().to_string();
            if name.is_empty() {
                return Err(Error::Manifest("extension without a name".into()));
            }
            let id = record
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| slug(&name));

            let mut entry = ExtensionEntry::new(id, name, record.description, record.kind, record.invocation);
            entry.keywords = record.keywords;
            entry.required_packages = record.required_packages;
            entry.refresh_derived(transliterator);
            Ok(entry)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_list() {
        let json = r#"[
            {"name": "Alipay Scan!", "description": "扫一扫", "type": "scheme",
             "invocation": "alipays://scan", "keywords": ["pay"],
             "requiredPackages": ["com.eg.android.AlipayGphone"]},
            {"id": "wifi", "name": "Wi-Fi", "type": "intent",
             "data": "android.settings.WIFI_SETTINGS"}
        ]"#;
        let entries = parse_manifest(json, &Transliterator::new()).unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].id, "alipay-scan");
        assert_eq!(entries[0].kind, ExtensionKind::Scheme);
        assert_eq!(entries[0].required_packages, vec!["com.eg.android.AlipayGphone"]);
        assert!(entries[0].search_target.contains("扫一扫"));
        assert!(entries[0].search_target.contains("pay"));
        assert_eq!(entries[0].abbreviation, "AS");

        assert_eq!(entries[1].id, "wifi");
        assert_eq!(entries[1].invocation, "android.settings.WIFI_SETTINGS");
        assert!(entries[1].keywords.is_empty());
    }

    #[test]
    fn parses_wrapped_document() {
        let json = r#"{"extensions": [{"name": "Dial", "type": "action", "invocation": "dialer"}]}"#;
        let entries = parse_manifest(json, &Transliterator::new()).unwrap();
        assert_eq!(entries[0].id, "dial");
        assert_eq!(entries[0].kind, ExtensionKind::Action);
    }

    #[test]
    fn rejects_bad_shapes() {
        let tr = Transliterator::new();
        assert!(matches!(parse_manifest("{\"nope\": 1}", &tr), Err(Error::Json(_))));
        assert!(matches!(
            parse_manifest(r#"[{"name": "X", "type": "widget", "invocation": "x"}]"#, &tr),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            parse_manifest(r#"[{"name": "  ", "type": "action", "invocation": "x"}]"#, &tr),
            Err(Error::Manifest(_))
        ));
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("Alipay Scan!"), "alipay-scan");
        assert_eq!(slug("  --Hello__World--"), "hello-world");
        assert_eq!(slug("扫一扫"), "扫一扫");
    }
}
