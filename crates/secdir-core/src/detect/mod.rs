//! Change detection over the plaintext tree
//!
//! Regular files and symlinks are classified separately. Files come from a
//! walk that never follows links, so the contents of a symlinked directory
//! are never picked up as files of their own. Links come from two walks:
//! one that follows links in order to see which of them are directories
//! (without descending into them), and one that does not, for links to
//! files and anything the first walk could not follow. Names that are not
//! valid UTF-8 have no lossless registry key and are skipped with a warning.

mod change;

pub use change::{Change, ChangeSet, ChangeStatus, EntryKind};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use secdir_fs::NormalizedPath;
use walkdir::WalkDir;

use crate::registry::Snapshot;
use crate::{Error, Result};

/// Classifies plaintext entries against a registry snapshot and watermark
#[derive(Debug)]
pub struct ChangeDetector<'a> {
    root: &'a Path,
    snapshot: &'a Snapshot,
    watermark: i64,
}

impl<'a> ChangeDetector<'a> {
    /// `watermark` must be the value from before the current run advanced it.
    pub fn new(root: &'a Path, snapshot: &'a Snapshot, watermark: i64) -> Self {
        Self {
            root,
            snapshot,
            watermark,
        }
    }

    /// Classify files and links.
    pub fn classify(&self) -> Result<ChangeSet> {
        let mut changes = self.classify_files()?;
        changes.merge(self.classify_links()?);
        Ok(changes)
    }

    /// Classify regular files. Only unseen and changed files are returned.
    pub fn classify_files(&self) -> Result<ChangeSet> {
        self.check_root()?;
        let mut changes = ChangeSet::default();

        for entry in WalkDir::new(self.root).follow_links(false).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.skip(&mut changes.warnings, format!("cannot read entry: {e}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let modified = entry
                .metadata()
                .map_err(|e| e.to_string())
                .and_then(|m| m.modified().map_err(|e| e.to_string()));
            let modified = match modified {
                Ok(modified) => modified,
                Err(e) => {
                    let message = format!("{}: cannot read metadata: {e}", entry.path().display());
                    self.skip(&mut changes.warnings, message);
                    continue;
                }
            };
            let Some(path) = self.relative(entry.path(), &mut changes.warnings) else {
                continue;
            };

            if let Some(change) = self.decide(path, EntryKind::File, modified, None) {
                changes.files.push(change);
            }
        }

        Ok(changes)
    }

    /// Classify symlinks, whether they point at files, directories or
    /// nothing. Only unseen and changed links are returned.
    pub fn classify_links(&self) -> Result<ChangeSet> {
        self.check_root()?;
        let mut changes = ChangeSet::default();
        let mut found: BTreeMap<NormalizedPath, Change> = BTreeMap::new();

        // Links to directories: only visible as directories when following
        let mut walker = WalkDir::new(self.root).follow_links(true).min_depth(1).into_iter();
        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Dangling links and links back to an ancestor cannot be
                    // followed; they are still links to record
                    match e.path().filter(|p| is_symlink(p)) {
                        Some(link) => self.classify_link(link, &mut found, &mut changes.warnings),
                        None => self.skip(&mut changes.warnings, format!("cannot read entry: {e}")),
                    }
                    continue;
                }
            };
            if entry.path_is_symlink() && entry.file_type().is_dir() {
                self.classify_link(entry.path(), &mut found, &mut changes.warnings);
                walker.skip_current_dir();
            }
        }

        // Every other link, seen without following
        for entry in WalkDir::new(self.root).follow_links(false).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.skip(&mut changes.warnings, format!("cannot read entry: {e}"));
                    continue;
                }
            };
            if entry.file_type().is_symlink() {
                self.classify_link(entry.path(), &mut found, &mut changes.warnings);
            }
        }

        changes.links = found.into_values().collect();
        Ok(changes)
    }

    fn classify_link(
        &self,
        link: &Path,
        found: &mut BTreeMap<NormalizedPath, Change>,
        warnings: &mut Vec<String>,
    ) {
        let Some(path) = self.relative(link, warnings) else {
            return;
        };
        if found.contains_key(&path) {
            return;
        }

        let modified = match fs::symlink_metadata(link).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                self.skip(warnings, format!("{}: cannot read link metadata: {e}", link.display()));
                return;
            }
        };
        let target = match fs::read_link(link) {
            Ok(target) => target,
            Err(e) => {
                self.skip(warnings, format!("{}: cannot read link target: {e}", link.display()));
                return;
            }
        };
        let Some(target) = target.to_str().map(str::to_string) else {
            self.skip(warnings, format!("{}: link target is not valid UTF-8", link.display()));
            return;
        };

        if let Some(change) = self.decide(path.clone(), EntryKind::Link, modified, Some(target)) {
            found.insert(path, change);
        }
    }

    fn decide(
        &self,
        path: NormalizedPath,
        kind: EntryKind,
        modified: SystemTime,
        target: Option<String>,
    ) -> Option<Change> {
        let since_epoch = modified.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        let status = if !self.snapshot.contains_key(&path) {
            ChangeStatus::Unseen
        } else if since_epoch > self.watermark_duration() {
            ChangeStatus::Changed
        } else {
            ChangeStatus::Unchanged
        };

        if status == ChangeStatus::Unchanged {
            tracing::debug!(%path, %kind, "Unchanged since last run");
            return None;
        }
        tracing::debug!(%path, %kind, ?status, "Needs encryption");

        Some(Change {
            path,
            status,
            kind,
            modified: i64::try_from(since_epoch.as_secs()).unwrap_or(i64::MAX),
            target,
        })
    }

    fn watermark_duration(&self) -> Duration {
        Duration::from_secs(u64::try_from(self.watermark).unwrap_or(0))
    }

    fn relative(&self, path: &Path, warnings: &mut Vec<String>) -> Option<NormalizedPath> {
        match NormalizedPath::relative(self.root, path) {
            Ok(path) => Some(path),
            Err(e) => {
                self.skip(warnings, e.to_string());
                None
            }
        }
    }

    /// The link walks revisit what the file walk saw, so a message is
    /// recorded once.
    fn skip(&self, warnings: &mut Vec<String>, message: String) {
        if warnings.contains(&message) {
            return;
        }
        tracing::warn!("Skipping unreadable entry: {message}");
        warnings.push(message);
    }

    fn check_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(Error::config(format!(
                "plaintext root {} is not a directory",
                self.root.display()
            )))
        }
    }
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
