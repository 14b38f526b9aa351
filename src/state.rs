use std::collections::HashSet;
use std::sync::Arc;
use crate::config::{Config, ExtensionDisplay};
use crate::error::Result;
use crate::model::StarShortcut;
use crate::search::{self, Candidate, Exclusions, SearchMode, SearchOptions, SearchResults};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Success,
    Warning,
    Error,
}

/// Transient inline banner text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: MessageLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: MessageLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: MessageLevel::Error, text: text.into() }
    }
}

/// Holds at most one banner; a new one replaces the old.
#[derive(Debug, Default)]
pub struct MessageBar {
    current: Option<Message>,
}

impl MessageBar {
    pub fn show(&mut self, message: Message) {
        self.current = Some(message);
    }

    pub fn current(&self) -> Option<&Message> {
        self.current.as_ref()
    }

    pub fn dismiss(&mut self) -> Option<Message> {
        self.current.take()
    }
}

/// Everything a filter pass needs, detached from the state so it can run elsewhere.
pub struct SearchJob {
    pub generation: u64,
    query: String,
    candidates: Arc<[Candidate]>,
    stars: Arc<[StarShortcut]>,
    hidden: Arc<HashSet<String>>,
    options: SearchOptions,
}

impl SearchJob {
    pub fn run(&self) -> SearchResults {
        search::search(&self.query, &self.candidates, &self.stars, &self.hidden, self.options)
    }
}

pub struct AppState {
    candidates: Arc<[Candidate]>,
    stars: Arc<[StarShortcut]>,
    hidden: Arc<HashSet<String>>,
    options: SearchOptions,
    generation: u64,
    pub query: String,
    pub results: SearchResults,
    pub selected_index: usize,
    pub messages: MessageBar,
}

impl AppState {
    pub fn new(options: SearchOptions) -> Self {
        Self {
            candidates: Arc::from(Vec::new()),
            stars: Arc::from(Vec::new()),
            hidden: Arc::new(HashSet::new()),
            options,
            generation: 0,
            query: String::new(),
            results: SearchResults::default(),
            selected_index: 0,
            messages: MessageBar::default(),
        }
    }

    /// Snapshot of everything searchable in the store, filtered by the config.
    pub fn load(store: &Store, config: &Config) -> Result<Self> {
        let apps = store.list_apps()?;
        let extensions = match config.ui.extension_display {
            ExtensionDisplay::Hidden => Vec::new(),
            _ => store.list_extensions()?,
        };
        let exclusions = Exclusions::new(&config.search.exclude);

        let mut state = Self::new(SearchOptions::from_config(&config.search));
        state.stars = Arc::from(store.list_stars()?);
        state.hidden = Arc::new(store.hidden_keys()?);
        state.set_candidates(search::build_candidates(&apps, &extensions, &exclusions));
        Ok(state)
    }

    /// Replaces the candidate list wholesale, e.g. after a rescan.
    pub fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = Arc::from(candidates);
        self.update_filter();
    }

    pub fn set_stars(&mut self, stars: Vec<StarShortcut>) {
        self.stars = Arc::from(stars);
        self.update_filter();
    }

    pub fn set_hidden(&mut self, hidden: HashSet<String>) {
        self.hidden = Arc::new(hidden);
        self.update_filter();
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.options.mode = if fuzzy { SearchMode::Fuzzy } else { SearchMode::Exact };
        self.update_filter();
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn update_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.update_filter();
    }

    pub fn update_filter(&mut self) {
        let job = self.begin_search();
        let results = job.run();
        self.apply_results(job.generation, results);
    }

    /// Starts a new filter pass; any pass begun earlier becomes stale.
    pub fn begin_search(&mut self) -> SearchJob {
        self.generation += 1;
        SearchJob {
            generation: self.generation,
            query: self.query.clone(),
            candidates: Arc::clone(&self.candidates),
            stars: Arc::clone(&self.stars),
            hidden: Arc::clone(&self.hidden),
            options: self.options,
        }
    }

    /// Installs results unless a newer pass has started. Returns whether they were kept.
    pub fn apply_results(&mut self, generation: u64, results: SearchResults) -> bool {
        if generation != self.generation {
            log::debug!("AppState: dropping stale results (generation {} < {})", generation, self.generation);
            return false;
        }
        self.results = results;
        self.selected_index = 0;
        log::info!("AppState: query='{}', filtered_count={}", self.query, self.results.len());
        true
    }

    /// The unscored grid shown when nothing is being searched.
    pub fn grid(&self) -> Vec<Candidate> {
        search::all_apps(&self.candidates, &self.hidden)
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.results.is_empty() {
            self.selected_index = 0;
            return;
        }

        let len = self.results.len() as i32;
        let new_index = (self.selected_index as i32 + delta).rem_euclid(len);
        self.selected_index = new_index as usize;
    }

    pub fn get_selected(&self) -> Option<&Candidate> {
        self.results.iter().nth(self.selected_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AppEntry, InstalledPackage};
    use crate::transliterate::Transliterator;

    fn candidates() -> Vec<Candidate> {
        let tr = Transliterator::new();
        [("音乐", "org.music"), ("Camera", "org.camera"), ("Calendar", "org.calendar")]
            .into_iter()
            .map(|(label, package)| {
                let entry = AppEntry::from_package(
                    InstalledPackage {
                        label: label.into(),
                        package_name: package.into(),
                        command: None,
                    },
                    &tr,
                );
                Candidate::from(&entry)
            })
            .collect()
    }

    #[test]
    fn filters_per_keystroke() {
        let mut state = AppState::new(SearchOptions::default());
        state.set_candidates(candidates());
        assert!(state.results.is_empty());

        state.update_query("c");
        assert_eq!(state.results.len(), 3);
        state.update_query("ca");
        assert_eq!(state.results.len(), 2);
        state.update_query("cam");
        assert_eq!(state.get_selected().unwrap().key, "org.camera");
        state.update_query("");
        assert!(state.results.is_empty());
        assert_eq!(state.grid().len(), 3);
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut state = AppState::new(SearchOptions::default());
        state.set_candidates(candidates());

        state.query = "music".into();
        let old = state.begin_search();
        state.query = "cam".into();
        let new = state.begin_search();

        let new_results = new.run();
        assert!(state.apply_results(new.generation, new_results));
        assert!(!state.apply_results(old.generation, old.run()));
        assert_eq!(state.get_selected().unwrap().key, "org.camera");
    }

    #[test]
    fn selection_wraps() {
        let mut state = AppState::new(SearchOptions::default());
        state.set_candidates(candidates());
        state.update_query("org");
        assert_eq!(state.results.len(), 3);

        state.move_selection(-1);
        assert_eq!(state.selected_index, 2);
        state.move_selection(2);
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn toggling_fuzzy_refilters() {
        let mut state = AppState::new(SearchOptions::default());
        state.set_candidates(candidates());
        state.update_query("yiyu");
        assert!(state.results.is_empty());

        state.set_fuzzy(true);
        assert_eq!(state.get_selected().unwrap().key, "org.music");
    }

    #[test]
    fn hidden_and_stars_apply_immediately() {
        let mut state = AppState::new(SearchOptions::default());
        state.set_candidates(candidates());
        state.update_query("cal");
        assert_eq!(state.results.len(), 1);

        state.set_stars(vec![StarShortcut {
            key: "org.music".into(),
            keyword: "cal".into(),
            created_at: chrono::Utc::now(),
        }]);
        assert_eq!(state.get_selected().unwrap().key, "org.music");

        state.set_hidden(["org.music".to_string()].into());
        assert_eq!(state.get_selected().unwrap().key, "org.calendar");
    }

    #[test]
    fn load_from_store() {
        let tr = Transliterator::new();
        let mut store = Store::open_in_memory().unwrap();
        let apps: Vec<AppEntry> = [("Camera", "org.camera"), ("Ads", "com.ads.spam")]
            .into_iter()
            .map(|(label, package)| {
                AppEntry::from_package(
                    InstalledPackage { label: label.into(), package_name: package.into(), command: None },
                    &tr,
                )
            })
            .collect();
        store.replace_apps(&apps).unwrap();
        store.replace_extensions(&crate::extensions::builtin_extensions(&tr)).unwrap();
        store.insert_hidden("org.camera").unwrap();

        let mut config = Config::default();
        config.search.exclude = vec!["^com\\.ads\\.".into()];
        let state = AppState::load(&store, &config).unwrap();
        assert!(state.grid().is_empty());
        assert_eq!(state.candidates.len(), 4);

        config.ui.extension_display = ExtensionDisplay::Hidden;
        let state = AppState::load(&store, &config).unwrap();
        assert_eq!(state.candidates.len(), 1);
    }
}
