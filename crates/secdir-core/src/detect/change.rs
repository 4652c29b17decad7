//! Classification results

use secdir_fs::NormalizedPath;
use serde::Serialize;

/// How an entry compares to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    /// No registry row for the path
    Unseen,
    /// Registered, but modified after the watermark
    Changed,
    /// Registered and not modified since
    Unchanged,
}

/// Type of a plaintext entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Link,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Link => write!(f, "link"),
        }
    }
}

/// One classified plaintext entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    /// Path relative to the plaintext root
    pub path: NormalizedPath,
    pub status: ChangeStatus,
    pub kind: EntryKind,
    /// Modification time in whole Unix seconds (the link's own for links)
    pub modified: i64,
    /// Raw link target, links only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// Entries that need work, split by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub files: Vec<Change>,
    pub links: Vec<Change>,
    /// Entries that could not be read and were skipped
    pub warnings: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.links.len()
    }

    /// All changes, files first
    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.files.iter().chain(self.links.iter())
    }

    /// Fold another set into this one. A warning already recorded is not
    /// repeated.
    pub fn merge(&mut self, other: ChangeSet) {
        self.files.extend(other.files);
        self.links.extend(other.links);
        for warning in other.warnings {
            if !self.warnings.contains(&warning) {
                self.warnings.push(warning);
            }
        }
    }
}
