//! Filter and rank a candidate snapshot against a live query.
//!
//! Pure and synchronous: nothing here touches the store. Callers hand in the
//! candidate list, the star shortcuts and the hidden keys they loaded, and
//! get back a fresh result set for every keystroke.

use regex::Regex;
use std::cmp::Ordering;
use std::collections::HashSet;
use crate::config::SearchConfig;
use crate::matcher::FuzzyMatcher;
use crate::model::{AppEntry, ExtensionEntry, ExtensionKind, StarShortcut};

/// Combined fuzzy score (0..=200) a candidate has to exceed.
pub const DEFAULT_FUZZY_THRESHOLD: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    App,
    Extension(ExtensionKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    pub label: String,
    pub abbreviation: String,
    pub search_target: String,
    pub priority: i64,
    pub kind: CandidateKind,
}

impl From<&AppEntry> for Candidate {
    fn from(app: &AppEntry) -> Self {
        Self {
            key: app.package_name.clone(),
            label: app.label.clone(),
            abbreviation: app.abbreviation.clone(),
            search_target: app.search_target.clone(),
            priority: app.priority,
            kind: CandidateKind::App,
        }
    }
}

impl From<&ExtensionEntry> for Candidate {
    fn from(ext: &ExtensionEntry) -> Self {
        Self {
            key: ext.id.clone(),
            label: ext.name.clone(),
            abbreviation: ext.abbreviation.clone(),
            search_target: ext.search_target.clone(),
            priority: ext.priority,
            kind: CandidateKind::Extension(ext.kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub threshold: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            mode: SearchMode::Exact,
            threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

impl SearchOptions {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            mode: if config.fuzzy { SearchMode::Fuzzy } else { SearchMode::Exact },
            threshold: config.fuzzy_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub candidate: Candidate,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Exact star-keyword hits, always shown first.
    pub starred: Vec<Candidate>,
    pub ranked: Vec<Ranked>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.starred.is_empty() && self.ranked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.starred.len() + self.ranked.len()
    }

    /// Starred first, then ranked.
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.starred
            .iter()
            .chain(self.ranked.iter().map(|r| &r.candidate))
    }
}

/// Regex based suppression from the config, applied on top of hidden entries.
#[derive(Debug, Default)]
pub struct Exclusions {
    patterns: Vec<Regex>,
}

impl Exclusions {
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::warn!("Skipping invalid exclude pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    pub fn is_excluded(&self, candidate: &Candidate) -> bool {
        self.patterns
            .iter()
            .any(|re| re.is_match(&candidate.label) || re.is_match(&candidate.key))
    }
}

/// Flattens apps and extensions into one searchable list.
pub fn build_candidates(
    apps: &[AppEntry],
    extensions: &[ExtensionEntry],
    exclusions: &Exclusions,
) -> Vec<Candidate> {
    apps.iter()
        .map(Candidate::from)
        .chain(extensions.iter().map(Candidate::from))
        .filter(|c| !exclusions.is_excluded(c))
        .collect()
}

fn by_score_then_priority(a: &Ranked, b: &Ranked) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.candidate.priority.cmp(&a.candidate.priority))
        .then_with(|| a.candidate.label.cmp(&b.candidate.label))
}

pub fn search(
    query: &str,
    candidates: &[Candidate],
    stars: &[StarShortcut],
    hidden: &HashSet<String>,
    options: SearchOptions,
) -> SearchResults {
    let query = query.trim();
    if query.is_empty() {
        return SearchResults::default();
    }
    let query_lower = query.to_lowercase();

    let mut starred: Vec<Candidate> = Vec::new();
    for star in stars
        .iter()
        .filter(|s| s.keyword.trim().to_lowercase() == query_lower)
    {
        if starred.iter().any(|c| c.key == star.key) || hidden.contains(&star.key) {
            continue;
        }
        if let Some(candidate) = candidates.iter().find(|c| c.key == star.key) {
            starred.push(candidate.clone());
        }
    }
    starred.sort_by(|a, b| b.priority.cmp(&a.priority));

    let eligible = candidates
        .iter()
        .filter(|c| !hidden.contains(&c.key))
        .filter(|c| !starred.iter().any(|s| s.key == c.key));

    let mut ranked: Vec<Ranked> = match options.mode {
        SearchMode::Exact => eligible
            .filter(|c| c.search_target.to_lowercase().contains(&query_lower))
            .map(|c| Ranked { candidate: c.clone(), score: 0 })
            .collect(),
        SearchMode::Fuzzy => {
            let matcher = FuzzyMatcher::new(query);
            eligible
                .filter_map(|c| {
                    let score = matcher.combined(&c.abbreviation, &c.search_target);
                    (score > options.threshold).then(|| Ranked { candidate: c.clone(), score })
                })
                .collect()
        }
    };
    ranked.sort_by(by_score_then_priority);

    log::debug!(
        "search: query='{}', mode={:?}, starred={}, ranked={}",
        query,
        options.mode,
        starred.len(),
        ranked.len()
    );

    SearchResults { starred, ranked }
}

/// The unscored app grid: every visible app, most used first.
pub fn all_apps(candidates: &[Candidate], hidden: &HashSet<String>) -> Vec<Candidate> {
    let mut apps: Vec<Candidate> = candidates
        .iter()
        .filter(|c| c.kind == CandidateKind::App && !hidden.contains(&c.key))
        .cloned()
        .collect();
    apps.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.label.cmp(&b.label)));
    apps
}
