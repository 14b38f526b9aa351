use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::target;
use crate::transliterate::Transliterator;

/// What a package scan reports for one launchable app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub label: String,
    pub package_name: String,
    pub command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub label: String,
    pub package_name: String,    // Unique key
    pub abbreviation: String,    // Derived from label
    pub search_target: String,   // Derived from label + package
    pub priority: i64,           // Launch counter
    pub command: Option<String>, // Falls back to the configured launch template
}

impl AppEntry {
    pub fn from_package(pkg: InstalledPackage, transliterator: &Transliterator) -> Self {
        let mut entry = Self {
            label: pkg.label,
            package_name: pkg.package_name,
            abbreviation: String::new(),
            search_target: String::new(),
            priority: 0,
            command: pkg.command,
        };
        entry.refresh_derived(transliterator);
        entry
    }

    pub fn refresh_derived(&mut self, transliterator: &Transliterator) {
        let t = transliterator.transliterate(&self.label);
        self.search_target = target::app_target(&self.label, &self.package_name, &t);
        self.abbreviation = t.abbreviation;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    Intent,
    Action,
    Scheme,
    Internal,
}

impl ExtensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::Intent => "intent",
            ExtensionKind::Action => "action",
            ExtensionKind::Scheme => "scheme",
            ExtensionKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intent" => Ok(ExtensionKind::Intent),
            "action" => Ok(ExtensionKind::Action),
            "scheme" => Ok(ExtensionKind::Scheme),
            "internal" => Ok(ExtensionKind::Internal),
            other => Err(format!("unknown extension type '{other}'")),
        }
    }
}

/// A searchable non-app action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kind: ExtensionKind,
    /// Intent action, URI, command line or built-in feature id, depending on `kind`.
    pub invocation: String,
    pub keywords: Vec<String>,
    pub required_packages: Vec<String>,
    pub priority: i64,
    pub abbreviation: String,
    pub search_target: String,
}

impl ExtensionEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ExtensionKind,
        invocation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            kind,
            invocation: invocation.into(),
            keywords: Vec::new(),
            required_packages: Vec::new(),
            priority: 0,
            abbreviation: String::new(),
            search_target: String::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn refresh_derived(&mut self, transliterator: &Transliterator) {
        let t = transliterator.transliterate(&self.name);
        self.search_target = target::extension_target(
            &self.name,
            &self.id,
            &t,
            &self.description,
            &self.keywords,
            transliterator,
        );
        self.abbreviation = t.abbreviation;
    }
}

/// One launch. `key` is a package name or an extension id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEvent {
    pub key: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarShortcut {
    pub key: String,
    pub keyword: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenEntry {
    pub key: String,
    pub created_at: DateTime<Utc>,
}
