//! Encrypt orchestration
//!
//! Brings the ciphertext tree and the registry up to date with the
//! plaintext tree: every unseen or changed file gets a fresh blob, every
//! unseen or changed symlink gets a registry row.

use std::path::Path;

use secdir_fs::NormalizedPath;
use secdir_gpg::Cipher;

use super::report::{Outcome, RunReport};
use crate::config::RunConfig;
use crate::detect::{Change, ChangeDetector, ChangeStatus, EntryKind};
use crate::naming;
use crate::registry::{Registry, RegistryEntry, Snapshot};
use crate::{Error, Result};

/// Runs one encrypt pass
pub struct EncryptEngine<'a> {
    config: &'a RunConfig,
    cipher: &'a dyn Cipher,
}

impl<'a> EncryptEngine<'a> {
    pub fn new(config: &'a RunConfig, cipher: &'a dyn Cipher) -> Self {
        Self { config, cipher }
    }

    /// Encrypt everything new or modified since the last run.
    ///
    /// The watermark is advanced before the tree is scanned and the scan
    /// compares against the value it replaced, so edits made while this run
    /// is in progress are seen again by the next one.
    ///
    /// # Errors
    ///
    /// Fails before touching anything if the plaintext root is missing, and
    /// aborts if the registry cannot be written. Failures of individual
    /// entries are recorded in the report instead.
    pub fn run(&self, registry: &mut Registry) -> Result<RunReport> {
        if !self.config.plaindir.is_dir() {
            return Err(Error::config(format!(
                "plaintext root {} is not a directory",
                self.config.plaindir.display()
            )));
        }

        let snapshot = registry.snapshot();
        let previous = registry.watermark();
        let watermark = registry.advance_watermark()?;
        let mut report = RunReport {
            watermark: Some(watermark),
            ..RunReport::default()
        };

        secdir_fs::ensure_dir(&self.config.securedir)?;
        let detector = ChangeDetector::new(&self.config.plaindir, &snapshot, previous);

        let files = detector.classify_files()?;
        files.warnings.into_iter().for_each(|w| report.warn(w));
        for change in files.files {
            self.encrypt_file(registry, &snapshot, change, &mut report)?;
        }

        let links = detector.classify_links()?;
        links.warnings.into_iter().for_each(|w| report.warn(w));
        for change in links.links {
            self.register_link(registry, &snapshot, change, &mut report)?;
        }

        tracing::info!(
            encrypted = report.succeeded(),
            failed = report.failed(),
            watermark,
            "Encrypt run finished"
        );
        Ok(report)
    }

    fn encrypt_file(
        &self,
        registry: &mut Registry,
        snapshot: &Snapshot,
        change: Change,
        report: &mut RunReport,
    ) -> Result<()> {
        let securedir = &self.config.securedir;
        let path = change.path;
        let previous = snapshot.get(&path);

        // The stale blob goes before the new row is committed
        let mut retired = false;
        if change.status == ChangeStatus::Changed
            && let Some(old) = previous.filter(|entry| entry.has_blob())
        {
            match secdir_fs::delete_blob(securedir, &old.ciphertext_name) {
                Ok(_) => retired = true,
                Err(e) => {
                    tracing::warn!(%path, error = %e, "Could not delete stale blob");
                    report.warn(format!(
                        "{path}: could not delete stale blob {}: {e}",
                        old.ciphertext_name
                    ));
                }
            }
        }

        let name = naming::opaque_name();
        let plaintext = self.config.plaindir.join(path.to_native());
        let ciphertext = securedir.join(&name);
        tracing::debug!(%path, blob = %name, "Encrypting");

        match self.cipher.encrypt(&plaintext, &ciphertext) {
            Ok(()) => {
                registry.upsert(
                    path.clone(),
                    RegistryEntry::file(name.as_str(), self.config.public_id.as_str()),
                )?;
                report.push(
                    path,
                    EntryKind::File,
                    Outcome::Encrypted {
                        ciphertext_name: name,
                        replaced: previous.is_some(),
                    },
                );
            }
            Err(e) => {
                tracing::warn!(%path, error = %e, "Encryption failed");
                discard_partial(securedir, &name);

                // A row that no longer names a live blob would hide the file
                // from the next run
                if previous.is_some_and(|old| retired || !old.has_blob()) {
                    registry.remove(&path)?;
                }
                report.push(
                    path,
                    EntryKind::File,
                    Outcome::Failed {
                        error: e.to_string(),
                    },
                );
            }
        }
        Ok(())
    }

    fn register_link(
        &self,
        registry: &mut Registry,
        snapshot: &Snapshot,
        change: Change,
        report: &mut RunReport,
    ) -> Result<()> {
        let path = change.path;
        let target = change.target.unwrap_or_default();

        if let Some(old) = snapshot.get(&path) {
            if old.has_blob() {
                self.retire_replaced_file(&path, old, report);
            }
            registry.remove(&path)?;
        }

        tracing::debug!(%path, %target, "Registering link");
        registry.upsert(
            path.clone(),
            RegistryEntry::link(target.as_str(), self.config.public_id.as_str()),
        )?;
        report.push(path, EntryKind::Link, Outcome::LinkRegistered { target });
        Ok(())
    }

    /// A regular file replaced by a link leaves its blob behind.
    fn retire_replaced_file(&self, path: &NormalizedPath, old: &RegistryEntry, report: &mut RunReport) {
        if let Err(e) = secdir_fs::delete_blob(&self.config.securedir, &old.ciphertext_name) {
            tracing::warn!(%path, error = %e, "Could not delete blob of replaced file");
            report.warn(format!(
                "{path}: could not delete blob {} of replaced file: {e}",
                old.ciphertext_name
            ));
        }
    }
}

fn discard_partial(securedir: &Path, name: &str) {
    if let Err(e) = secdir_fs::delete_blob(securedir, name) {
        tracing::debug!(blob = name, error = %e, "Could not remove partial output");
    }
}
