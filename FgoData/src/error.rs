//! Error types for `fgodata`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `fgodata` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration file could not be parsed.
    #[error("config error: {0}")]
    ConfigError(#[from] toml::de::Error),

    /// A level-transition marker did not advance by exactly one level.
    ///
    /// The wiki table no longer matches the known layout; the record is abandoned.
    #[error("level transition Lv{current}→Lv{next} does not advance by one")]
    LevelTransition {
        /// Level the marker transitions from.
        current: u32,
        /// Level the marker transitions to.
        next: u32,
    },

    /// A servant class code or name outside the known set.
    #[error("unknown servant class: {0}")]
    UnknownClass(String),

    // ==================== Resolution Errors ====================
    /// An item name is missing from the name→id dictionary.
    #[error("unresolved item name: {name}")]
    UnresolvedItem {
        /// The item name as written on the wiki.
        name: String,
    },

    // ==================== Network Errors ====================
    /// The page request failed before a response was received.
    #[error("failed to fetch {url}: {message}")]
    FetchFailed {
        /// Requested URL.
        url: String,
        /// Transport error message.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    // ==================== Data Set Errors ====================
    /// A patch file key is not a servant id.
    #[error("invalid servant id in patch file: {0}")]
    InvalidPatchKey(String),

    /// A required document is missing from the data directory.
    #[error("missing data file: {path}")]
    MissingDataFile {
        /// The expected path.
        path: PathBuf,
    },
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `fgodata` operations.
pub type Result<T> = std::result::Result<T, Error>;
