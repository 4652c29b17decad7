//! Resolution of stored parameters and overrides into a run configuration

use std::path::PathBuf;

use secdir_fs::expand_tilde;
use secdir_gpg::GpgOptions;

use super::parameters::{ParameterOverrides, StoredParameters, required};
use crate::Result;

const DEFAULT_GPG_BINARY: &str = "gpg";

/// The effective, immutable configuration of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Root of the plaintext tree, tilde-expanded
    pub plaindir: PathBuf,
    /// Root of the ciphertext tree, tilde-expanded
    pub securedir: PathBuf,
    /// Identity new entries are registered under and decryption filters on
    pub public_id: String,
    pub gpg_binary: PathBuf,
    pub gpg_homedir: Option<PathBuf>,
    pub gpg_keyring: Option<String>,
}

impl RunConfig {
    /// Resolve stored parameters and caller overrides.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingParameter`] if `plaindir`, `securedir`
    /// or `public_id` is set in neither source.
    pub fn resolve(stored: &StoredParameters, overrides: &ParameterOverrides) -> Result<Self> {
        let merged = overrides.apply_to(stored);

        let plaindir = expand_tilde(required("plaindir", &merged.plaindir)?);
        let securedir = expand_tilde(required("securedir", &merged.securedir)?);
        let public_id = required("public_id", &merged.public_id)?.to_string();

        let gpg_binary = merged
            .gpg_binary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(expand_tilde)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GPG_BINARY));
        let gpg_homedir = merged
            .gpg_homedir
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(expand_tilde);
        let gpg_keyring = merged.gpg_keyring.filter(|s| !s.trim().is_empty());

        let config = Self {
            plaindir,
            securedir,
            public_id,
            gpg_binary,
            gpg_homedir,
            gpg_keyring,
        };
        tracing::debug!(?config, "Resolved run configuration");
        Ok(config)
    }

    /// Options for a [`secdir_gpg::GpgCipher`] matching this configuration
    pub fn gpg_options(&self) -> GpgOptions {
        GpgOptions {
            binary: self.gpg_binary.clone(),
            homedir: self.gpg_homedir.clone(),
            keyring: self.gpg_keyring.clone(),
            recipient: self.public_id.clone(),
        }
    }
}
