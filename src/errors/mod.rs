use rusqlite::ffi;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatorError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // User input errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),

    // Business errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    DuplicateKey(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // Parsing errors
    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage lock poisoned: a previous database operation panicked")]
    LockPoisoned,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatorError {
    /// Map a failed insert to `DuplicateKey` when SQLite rejected it on a
    /// unique or primary key constraint.
    pub fn from_insert(err: rusqlite::Error, what: impl Into<String>) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                GatorError::DuplicateKey(what.into())
            }
            _ => GatorError::Database(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatorError::NotFound(_))
    }
}

pub type GatorResult<T> = Result<T, GatorError>;
