//! Error types for secdir-core

use std::path::PathBuf;

/// Result type for secdir-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of an error, used to decide whether a run aborts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid parameters; aborts before any I/O
    Config,
    /// Registry store unavailable or corrupt; aborts the run
    Registry,
    /// Encrypt or decrypt call failed; recorded per entry
    Collaborator,
    /// Blob deletion, symlink creation and other file operations
    Filesystem,
}

/// Errors that can occur in secdir-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required parameter is absent from both the store and the overrides
    #[error("Missing required parameter: {key}")]
    MissingParameter { key: &'static str },

    /// Parameters are present but unusable
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The registry store does not exist yet
    #[error("Registry not found at {path} (run `secdir init` first)")]
    RegistryNotFound { path: PathBuf },

    /// The registry store could not be read, parsed, locked or written
    #[error("Registry error at {path}: {message}")]
    Registry { path: PathBuf, message: String },

    /// Error from the encryption collaborator
    #[error(transparent)]
    Collaborator(#[from] secdir_gpg::Error),

    /// Filesystem error from secdir-fs
    #[error(transparent)]
    Fs(#[from] secdir_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn registry(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Registry {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter { .. } | Self::Config { .. } => ErrorKind::Config,
            Self::RegistryNotFound { .. } | Self::Registry { .. } => ErrorKind::Registry,
            Self::Collaborator(_) => ErrorKind::Collaborator,
            Self::Fs(_) | Self::Io(_) => ErrorKind::Filesystem,
        }
    }
}
