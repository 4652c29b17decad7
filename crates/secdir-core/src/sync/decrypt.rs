//! Decrypt orchestration

use std::path::Path;

use secdir_fs::NormalizedPath;
use secdir_gpg::Cipher;

use super::report::{Outcome, RunReport};
use crate::config::RunConfig;
use crate::detect::EntryKind;
use crate::naming;
use crate::registry::{Registry, RegistryEntry};
use crate::{Error, Result};

/// Restores the plaintext tree from the registry
pub struct DecryptEngine<'a> {
    config: &'a RunConfig,
    cipher: &'a dyn Cipher,
}

impl<'a> DecryptEngine<'a> {
    pub fn new(config: &'a RunConfig, cipher: &'a dyn Cipher) -> Self {
        Self { config, cipher }
    }

    /// Restore every entry registered for the configured recipient.
    ///
    /// Entries of other recipients are counted in [`RunReport::skipped`] and
    /// left alone. Per-entry failures are recorded and the run continues.
    pub fn run(&self, registry: &Registry, passphrase: &str) -> Result<RunReport> {
        let mut report = RunReport::default();

        for (path, entry) in registry.snapshot() {
            if entry.recipient_id != self.config.public_id {
                tracing::debug!(%path, recipient = %entry.recipient_id, "Skipping other recipient");
                report.skipped += 1;
                continue;
            }

            let kind = if entry.is_link {
                EntryKind::Link
            } else {
                EntryKind::File
            };
            let outcome = match path.resolve_under(&self.config.plaindir) {
                Ok(plaintext) if entry.is_link => restore_link(&path, &entry, &plaintext),
                Ok(plaintext) => self.decrypt_file(&path, &entry, &plaintext, passphrase),
                Err(e) => Err(e.into()),
            };

            match outcome {
                Ok(outcome) => report.push(path, kind, outcome),
                Err(e) => {
                    tracing::warn!(%path, error = %e, "Could not restore entry");
                    report.push(
                        path,
                        kind,
                        Outcome::Failed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        tracing::info!(
            restored = report.succeeded(),
            failed = report.failed(),
            skipped = report.skipped,
            "Decrypt run finished"
        );
        Ok(report)
    }

    fn decrypt_file(
        &self,
        path: &NormalizedPath,
        entry: &RegistryEntry,
        plaintext: &Path,
        passphrase: &str,
    ) -> Result<Outcome> {
        if !naming::is_opaque_name(&entry.ciphertext_name) {
            return Err(Error::registry(
                self.config.securedir.as_path(),
                format!("invalid blob name {:?} for {path}", entry.ciphertext_name),
            ));
        }
        if let Some(parent) = plaintext.parent() {
            secdir_fs::ensure_dir(parent)?;
        }

        let ciphertext = self.config.securedir.join(&entry.ciphertext_name);
        tracing::debug!(%path, blob = %entry.ciphertext_name, "Decrypting");
        self.cipher.decrypt(&ciphertext, plaintext, passphrase)?;
        Ok(Outcome::Decrypted)
    }
}

fn restore_link(path: &NormalizedPath, entry: &RegistryEntry, plaintext: &Path) -> Result<Outcome> {
    let target = entry
        .link_target
        .clone()
        .ok_or_else(|| Error::config(format!("link entry {path} has no target")))?;

    tracing::debug!(%path, %target, "Restoring link");
    secdir_fs::create_symlink(&target, plaintext)?;
    Ok(Outcome::LinkRestored { target })
}
