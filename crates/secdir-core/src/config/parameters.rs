//! Parameter table persisted alongside the registry entries

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The `[parameters]` table of the registry store
///
/// Every key is optional on disk so that a partially initialised store can
/// still be opened; [`StoredParameters::validate`] enforces the required
/// ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredParameters {
    /// Root of the plaintext tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plaindir: Option<String>,

    /// Root of the ciphertext tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub securedir: Option<String>,

    /// Recipient identity files are encrypted for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,

    /// Watermark: completion time of the last encrypt run, in Unix seconds
    #[serde(default)]
    pub last_timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpg_keyring: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpg_homedir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpg_binary: Option<String>,
}

impl StoredParameters {
    /// Check that every required key is present and non-empty.
    pub fn validate(&self) -> Result<()> {
        required("plaindir", &self.plaindir)?;
        required("securedir", &self.securedir)?;
        required("public_id", &self.public_id)?;
        Ok(())
    }
}

pub(crate) fn required<'a>(key: &'static str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::MissingParameter { key }),
    }
}

/// Per-run overrides for stored parameters
///
/// `None` leaves the stored value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterOverrides {
    pub plaindir: Option<String>,
    pub securedir: Option<String>,
    pub public_id: Option<String>,
    pub gpg_keyring: Option<String>,
    pub gpg_homedir: Option<String>,
    pub gpg_binary: Option<String>,
}

impl ParameterOverrides {
    /// Returns true if no override is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay these overrides onto `stored`, leaving the watermark alone.
    pub fn apply_to(&self, stored: &StoredParameters) -> StoredParameters {
        let pick = |over: &Option<String>, base: &Option<String>| over.clone().or_else(|| base.clone());

        StoredParameters {
            plaindir: pick(&self.plaindir, &stored.plaindir),
            securedir: pick(&self.securedir, &stored.securedir),
            public_id: pick(&self.public_id, &stored.public_id),
            last_timestamp: stored.last_timestamp,
            gpg_keyring: pick(&self.gpg_keyring, &stored.gpg_keyring),
            gpg_homedir: pick(&self.gpg_homedir, &stored.gpg_homedir),
            gpg_binary: pick(&self.gpg_binary, &stored.gpg_binary),
        }
    }
}
