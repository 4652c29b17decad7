//! Filesystem primitives for secdir
//!
//! Provides forward-slash normalized relative paths, atomic writes, and the
//! small set of fallible file operations the sync engine needs: deleting a
//! ciphertext blob, (re)creating a symlink, and expanding `~` in configured
//! paths.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use io::{create_symlink, delete_blob, ensure_dir, expand_tilde, write_atomic};
pub use path::NormalizedPath;
