//! App search and launch core: pinyin-aware fuzzy ranking over installed
//! apps and extensions, with usage-based priorities, star shortcuts and
//! hidden entries persisted in SQLite.

pub mod capability;
pub mod config;
pub mod error;
pub mod executor;
pub mod extensions;
pub mod matcher;
pub mod model;
pub mod search;
pub mod sources;
pub mod state;
pub mod store;
pub mod target;
pub mod tasks;
pub mod transliterate;

pub use error::{Error, Result};
