//! Atomic I/O and the file primitives used by the sync engine

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock on the temp file while writing.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}

/// Create `path` and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Delete the ciphertext blob `name` from the ciphertext tree at `root`.
///
/// Returns `Ok(false)` when the blob was already gone. Names are opaque
/// single components; anything that could address a file outside `root`
/// is rejected.
pub fn delete_blob(root: &Path, name: &str) -> Result<bool> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(Error::InvalidBlobName {
            name: name.to_string(),
        });
    }

    let path = root.join(name);
    match fs::remove_file(&path) {
        Ok(()) => {
            tracing::debug!(blob = %path.display(), "Deleted ciphertext blob");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(blob = %path.display(), "Ciphertext blob already absent");
            Ok(false)
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Create a symlink at `link` pointing at `target`.
///
/// Missing parent directories are created. A file or symlink already at
/// `link` is replaced; a real directory is left alone and reported as
/// [`Error::Occupied`]. The target is used verbatim and may dangle.
pub fn create_symlink(target: &str, link: &Path) -> Result<()> {
    if let Some(parent) = link.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }

    match fs::symlink_metadata(link) {
        Ok(meta) if meta.file_type().is_dir() => {
            return Err(Error::Occupied {
                path: link.to_path_buf(),
            });
        }
        Ok(_) => fs::remove_file(link).map_err(|e| Error::io(link, e))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(link, e)),
    }

    symlink(target, link).map_err(|e| Error::io(link, e))
}

#[cfg(unix)]
fn symlink(target: &str, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &str, link: &Path) -> std::io::Result<()> {
    let resolved = link
        .parent()
        .map(|p| p.join(target))
        .unwrap_or_else(|| PathBuf::from(target));
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Expand a leading `~` to the current user's home directory.
///
/// Paths without a leading `~`, and `~user` forms, are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = if path == "~" {
        Some("")
    } else {
        path.strip_prefix("~/")
            .or_else(|| path.strip_prefix("~\\"))
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
