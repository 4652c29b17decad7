//! Error types for cipher operations

use std::path::PathBuf;

/// Errors that can occur while encrypting or decrypting a single file
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured gpg binary could not be executed
    #[error("gpg binary not found at {path}")]
    BinaryNotFound {
        /// The binary that was tried
        path: PathBuf,
    },

    /// I/O error while spawning or talking to the subprocess
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Subprocess exited with non-zero status
    #[error("Command failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Exit code from the subprocess
        code: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// The input file handed to the cipher does not exist
    #[error("Input file not found: {path}")]
    InputMissing {
        /// The missing input
        path: PathBuf,
    },
}

/// Result type alias for cipher operations
pub type Result<T> = std::result::Result<T, Error>;
