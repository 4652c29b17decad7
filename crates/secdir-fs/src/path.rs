//! Normalized relative path handling
//!
//! Registry keys are plaintext paths relative to the plaintext root. They are
//! stored with forward slashes on every platform and converted to native
//! paths only when joined onto a root for I/O.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Used as the primary key of registry entries, so equality, ordering and
/// hashing all operate on the normalized string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from its string form.
    ///
    /// Drops empty and `.` segments and any trailing separator. Backslash
    /// is a separator on Windows only; elsewhere it is an ordinary file name
    /// character.
    pub fn new(path: impl AsRef<str>) -> Self {
        let raw = path.as_ref();
        let absolute = raw.starts_with(is_separator);
        let segments: Vec<&str> = raw
            .split(is_separator)
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();

        let mut inner = segments.join("/");
        if absolute {
            inner.insert(0, '/');
        }
        Self { inner }
    }

    /// Compute the path of `path` relative to `root`.
    ///
    /// Built from the path's components, so the result does not depend on
    /// whether `root` was configured with a trailing separator.
    ///
    /// # Errors
    ///
    /// [`Error::OutsideRoot`] if `path` does not live under `root`, and
    /// [`Error::NonUtf8Name`] if any component below `root` is not valid
    /// UTF-8 (such a name has no lossless key).
    pub fn relative(root: &Path, path: &Path) -> Result<Self> {
        let stripped = path.strip_prefix(root).map_err(|_| Error::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

        let mut segments: Vec<&str> = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| Error::NonUtf8Name {
                        path: path.to_path_buf(),
                    })?;
                    segments.push(name);
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::UnsafePath {
                        path: stripped.display().to_string(),
                    });
                }
            }
        }
        Ok(Self {
            inner: segments.join("/"),
        })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns true for the empty path (the root itself).
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        self.inner.split('/').collect()
    }

    /// Check that the path stays inside whatever root it is joined onto.
    ///
    /// Rejects empty paths, absolute paths and any `..` segment.
    pub fn validate_relative(&self) -> Result<()> {
        let unsafe_path = || Error::UnsafePath {
            path: self.inner.clone(),
        };

        if self.inner.is_empty() || self.inner.starts_with('/') {
            return Err(unsafe_path());
        }
        let native = self.to_native();
        if native.components().any(|c| !matches!(c, Component::Normal(_))) {
            return Err(unsafe_path());
        }
        Ok(())
    }

    /// Join this relative path onto `root`, refusing paths that escape it.
    pub fn resolve_under(&self, root: &Path) -> Result<PathBuf> {
        self.validate_relative()?;
        Ok(root.join(self.to_native()))
    }
}

#[cfg(windows)]
fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[cfg(not(windows))]
fn is_separator(c: char) -> bool {
    c == '/'
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}
