//! Registry rows

use serde::{Deserialize, Serialize};

/// One registered plaintext entry
///
/// A file row names the ciphertext blob holding its encrypted content. A
/// link row carries no blob, only the raw target string read from the
/// filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Opaque blob name in the ciphertext tree; empty for links
    #[serde(default)]
    pub ciphertext_name: String,
    /// Identity the entry was encrypted for
    pub recipient_id: String,
    #[serde(default)]
    pub is_link: bool,
    /// Present iff `is_link`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

impl RegistryEntry {
    /// A regular file encrypted into `ciphertext_name`
    pub fn file(ciphertext_name: impl Into<String>, recipient_id: impl Into<String>) -> Self {
        Self {
            ciphertext_name: ciphertext_name.into(),
            recipient_id: recipient_id.into(),
            is_link: false,
            link_target: None,
        }
    }

    /// A symlink pointing at `target`
    pub fn link(target: impl Into<String>, recipient_id: impl Into<String>) -> Self {
        Self {
            ciphertext_name: String::new(),
            recipient_id: recipient_id.into(),
            is_link: true,
            link_target: Some(target.into()),
        }
    }

    /// Whether a ciphertext blob backs this row
    pub fn has_blob(&self) -> bool {
        !self.is_link && !self.ciphertext_name.is_empty()
    }
}
