use thiserror::Error;

/// Errors raised by the launcher core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Extension manifest has the wrong shape
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Spawning a command failed or the command line was empty
    #[error("Launch error: {0}")]
    Launch(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Optional capability not present in this build
    #[error("Feature unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
