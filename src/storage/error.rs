//! Error types for storage collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The referenced record does not exist in storage
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What was looked up ("image", "region", "link")
        kind: &'static str,
        /// The missing id
        id: String,
    },

    /// Database file written by a newer, incompatible version
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build understands
        expected: String,
        /// Version found in the file
        found: String,
    },

    /// Backend temporarily unable to serve the request
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Database file path could not be used
    #[error("Invalid database path: {path:?}")]
    InvalidPath {
        /// The offending path
        path: PathBuf,
    },
}

impl StorageError {
    /// Create an image-not-found error.
    pub fn image_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "image",
            id: id.into(),
        }
    }

    /// Create a region-not-found error.
    pub fn region_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "region",
            id: id.into(),
        }
    }

    /// Create a link-not-found error.
    pub fn link_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "link",
            id: id.into(),
        }
    }

    /// Whether this is a missing-record error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}
