//! Error types for secdir-fs

use std::path::PathBuf;

/// Result type for secdir-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in secdir-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not inside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    #[error("{path} has a name that is not valid UTF-8")]
    NonUtf8Name { path: PathBuf },

    #[error("Refusing unsafe relative path: {path}")]
    UnsafePath { path: String },

    #[error("Invalid blob name: {name:?}")]
    InvalidBlobName { name: String },

    #[error("Cannot replace directory at {path} with a symlink")]
    Occupied { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
