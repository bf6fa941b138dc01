//! Error types for revlet_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using revlet_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during repository operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Repository metadata directory already exists at init time.
    #[error("Repository already exists at {path}")]
    RepositoryExists { path: PathBuf },

    /// Repository is missing or structurally invalid.
    #[error("Invalid repository at {path}: {reason}")]
    InvalidRepository { path: PathBuf, reason: String },

    /// Object not found in the store.
    #[error("Object not found: {digest}")]
    ObjectNotFound { digest: String },

    /// Stored object fails to parse as `type NUL payload`.
    #[error("Corrupt object {digest}: {reason}")]
    CorruptObject { digest: String, reason: String },

    /// Invalid digest format or encoding.
    #[error("Invalid digest: {reason}")]
    InvalidDigest { reason: String },

    /// Invalid object type.
    #[error("Invalid object type: expected {expected}, got {got}")]
    InvalidObjectType { expected: String, got: String },

    /// Invalid tree entry.
    #[error("Invalid tree entry: {reason}")]
    InvalidTreeEntry { reason: String },

    /// Commit payload fails to parse.
    #[error("Corrupt commit: {reason}")]
    CorruptCommit { reason: String },

    /// Commit message cannot be encoded in the line-oriented payload.
    #[error("Invalid commit message: {reason}")]
    InvalidCommitMessage { reason: String },
}

impl Error {
    /// Create a RepositoryExists error.
    pub fn repository_exists(path: impl Into<PathBuf>) -> Self {
        Error::RepositoryExists { path: path.into() }
    }

    /// Create an InvalidRepository error.
    pub fn invalid_repository(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidRepository {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an ObjectNotFound error.
    pub fn object_not_found(digest: impl Into<String>) -> Self {
        Error::ObjectNotFound {
            digest: digest.into(),
        }
    }

    /// Create a CorruptObject error.
    pub fn corrupt_object(digest: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::CorruptObject {
            digest: digest.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidDigest error.
    pub fn invalid_digest(reason: impl Into<String>) -> Self {
        Error::InvalidDigest {
            reason: reason.into(),
        }
    }

    /// Create an InvalidObjectType error.
    pub fn invalid_object_type(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Error::InvalidObjectType {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Create an InvalidTreeEntry error.
    pub fn invalid_tree_entry(reason: impl Into<String>) -> Self {
        Error::InvalidTreeEntry {
            reason: reason.into(),
        }
    }

    /// Create a CorruptCommit error.
    pub fn corrupt_commit(reason: impl Into<String>) -> Self {
        Error::CorruptCommit {
            reason: reason.into(),
        }
    }

    /// Create an InvalidCommitMessage error.
    pub fn invalid_commit_message(reason: impl Into<String>) -> Self {
        Error::InvalidCommitMessage {
            reason: reason.into(),
        }
    }
}

// Additional From implementations for external error types

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io { source: err.error }
    }
}
