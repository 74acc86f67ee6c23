use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the note store and its operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid note ID: {0}")]
    NotFound(u64),

    #[error("Parent note {0} not found")]
    ParentNotFound(u64),

    #[error("Corrupt data file {}: {reason}", path.display())]
    CorruptData { path: PathBuf, reason: String },

    #[error("Data file version {found} is newer than the latest supported version {latest}")]
    UnsupportedVersion { found: String, latest: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize notes: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
