//! Registry of encrypted entries
//!
//! The registry maps every plaintext path (relative to the plaintext root)
//! to the ciphertext blob that holds it, and stores the run parameters and
//! the watermark next to those rows. It is persisted as a single TOML
//! document:
//!
//! ```toml
//! version = "1.0"
//!
//! [parameters]
//! plaindir = "~/plain"
//! securedir = "~/secure"
//! public_id = "alice@example.com"
//! last_timestamp = 1700000000
//!
//! [entries."notes/a.txt"]
//! ciphertext_name = "6f1c2b8e-..."
//! recipient_id = "alice@example.com"
//! is_link = false
//! ```
//!
//! A [`Registry`] value is the scoped acquisition of that store for one run:
//! it holds an exclusive advisory lock until dropped, and every mutation is
//! written through atomically before the call returns.

mod entry;

pub use entry::RegistryEntry;

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use secdir_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

use crate::config::StoredParameters;
use crate::{Error, Result};

const FORMAT_VERSION: &str = "1.0";

/// Point-in-time copy of all registry rows, ordered by path
pub type Snapshot = BTreeMap<NormalizedPath, RegistryEntry>;

/// On-disk layout of the registry store
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RegistryDocument {
    /// Format version for forward compatibility
    version: String,
    #[serde(default)]
    parameters: StoredParameters,
    #[serde(default)]
    entries: Snapshot,
}

impl RegistryDocument {
    fn new() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            parameters: StoredParameters::default(),
            entries: BTreeMap::new(),
        }
    }
}

/// Exclusive, scoped handle on the registry store
///
/// The lock lives on a `<store>.lock` sidecar because the store itself is
/// replaced by rename on every write. It is released when the value is
/// dropped, on success and error paths alike.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    document: RegistryDocument,
    _lock: File,
}

impl Registry {
    /// Open an existing store.
    ///
    /// # Errors
    ///
    /// [`Error::RegistryNotFound`] if there is no store at `path`, and
    /// [`Error::Registry`] if it is locked by another run or cannot be
    /// parsed.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::RegistryNotFound {
                path: path.to_path_buf(),
            });
        }
        let lock = acquire_lock(path)?;
        let document = load_document(path)?;
        tracing::debug!(
            path = %path.display(),
            entries = document.entries.len(),
            "Opened registry"
        );

        Ok(Self {
            path: path.to_path_buf(),
            document,
            _lock: lock,
        })
    }

    /// Open the store at `path`, creating an empty one if it does not exist.
    pub fn open_or_create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::registry(path, e.to_string()))?;
        }

        let lock = acquire_lock(path)?;
        let existed = path.is_file();
        let document = if existed {
            load_document(path)?
        } else {
            RegistryDocument::new()
        };

        let registry = Self {
            path: path.to_path_buf(),
            document,
            _lock: lock,
        };
        if !existed {
            registry.persist()?;
            tracing::debug!(path = %path.display(), "Created registry");
        }
        Ok(registry)
    }

    /// Create the store at `path` if needed and write `parameters` into it.
    ///
    /// Existing entries are kept, as is a watermark newer than the one
    /// supplied.
    pub fn init(path: &Path, parameters: StoredParameters) -> Result<Self> {
        parameters.validate()?;
        let mut registry = Self::open_or_create(path)?;
        registry.set_parameters(parameters)?;
        tracing::info!(path = %path.display(), "Initialized registry");
        Ok(registry)
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the parameter table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameter`] if a required key is missing.
    pub fn read_parameters(&self) -> Result<StoredParameters> {
        self.document.parameters.validate()?;
        Ok(self.document.parameters.clone())
    }

    /// Read the parameter table without validating it
    pub fn raw_parameters(&self) -> &StoredParameters {
        &self.document.parameters
    }

    /// Replace the parameter table.
    ///
    /// The watermark never moves backwards: the stored value becomes the
    /// larger of the current and the supplied `last_timestamp`.
    pub fn set_parameters(&mut self, parameters: StoredParameters) -> Result<()> {
        let watermark = self
            .document
            .parameters
            .last_timestamp
            .max(parameters.last_timestamp);
        self.document.parameters = StoredParameters {
            last_timestamp: watermark,
            ..parameters
        };
        self.persist()
    }

    /// Full copy of all rows
    pub fn snapshot(&self) -> Snapshot {
        self.document.entries.clone()
    }

    /// Look up a single row
    pub fn get(&self, path: &NormalizedPath) -> Option<&RegistryEntry> {
        self.document.entries.get(path)
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.document.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.entries.is_empty()
    }

    /// Rows registered under `recipient_id`
    pub fn entries_for<'a>(
        &'a self,
        recipient_id: &'a str,
    ) -> impl Iterator<Item = (&'a NormalizedPath, &'a RegistryEntry)> + 'a {
        self.document
            .entries
            .iter()
            .filter(move |(_, entry)| entry.recipient_id == recipient_id)
    }

    /// Current watermark in Unix seconds
    pub fn watermark(&self) -> i64 {
        self.document.parameters.last_timestamp
    }

    /// Move the watermark to the current wall-clock time.
    ///
    /// Called once at the start of an encrypt run, before scanning, so
    /// anything modified while the run is in progress is picked up by the
    /// next one. Never moves the watermark backwards. Returns the new value.
    pub fn advance_watermark(&mut self) -> Result<i64> {
        let now = chrono::Utc::now().timestamp();
        let previous = self.document.parameters.last_timestamp;
        let next = previous.max(now);
        self.document.parameters.last_timestamp = next;
        self.persist()?;
        tracing::debug!(previous, next, "Advanced watermark");
        Ok(next)
    }

    /// Insert or replace the row for `path`
    pub fn upsert(&mut self, path: NormalizedPath, entry: RegistryEntry) -> Result<()> {
        tracing::debug!(%path, ?entry, "Registering entry");
        self.document.entries.insert(path, entry);
        self.persist()
    }

    /// Delete the row for `path`, returning it if it existed
    pub fn remove(&mut self, path: &NormalizedPath) -> Result<Option<RegistryEntry>> {
        let removed = self.document.entries.remove(path);
        if removed.is_some() {
            tracing::debug!(%path, "Removed entry");
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        let content = toml::to_string_pretty(&self.document)
            .map_err(|e| Error::registry(&self.path, e.to_string()))?;
        secdir_fs::write_atomic(&self.path, content.as_bytes())
            .map_err(|e| Error::registry(&self.path, e.to_string()))
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn acquire_lock(path: &Path) -> Result<File> {
    let lock_path = lock_path(path);
    let lock = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| Error::registry(path, format!("cannot open lock file: {e}")))?;

    lock.try_lock_exclusive()
        .map_err(|_| Error::registry(path, "registry is in use by another run"))?;
    Ok(lock)
}

fn load_document(path: &Path) -> Result<RegistryDocument> {
    let content = fs::read_to_string(path).map_err(|e| Error::registry(path, e.to_string()))?;
    let document: RegistryDocument =
        toml::from_str(&content).map_err(|e| Error::registry(path, format!("corrupt store: {e}")))?;

    if document.version != FORMAT_VERSION {
        return Err(Error::registry(
            path,
            format!("unsupported format version {}", document.version),
        ));
    }
    Ok(document)
}
