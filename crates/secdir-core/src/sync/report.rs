//! Per-run outcome reporting

use secdir_fs::NormalizedPath;
use serde::Serialize;

use crate::detect::EntryKind;

/// What happened to one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// A file was encrypted into a new blob
    Encrypted {
        ciphertext_name: String,
        /// Whether an earlier registration was superseded
        replaced: bool,
    },
    /// A symlink was registered
    LinkRegistered { target: String },
    /// A file was restored from its blob
    Decrypted,
    /// A symlink was recreated
    LinkRestored { target: String },
    /// The entry was left as it was
    Failed { error: String },
}

/// Outcome for a single registry path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub path: NormalizedPath,
    pub kind: EntryKind,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Report from an encrypt or decrypt run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Entries acted on, in processing order
    pub items: Vec<ItemOutcome>,
    /// Non-fatal problems that did not fail an entry
    pub warnings: Vec<String>,
    /// Rows belonging to other recipients (decrypt only)
    pub skipped: usize,
    /// Watermark stored at the start of the run (encrypt only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<i64>,
}

impl RunReport {
    pub fn push(&mut self, path: NormalizedPath, kind: EntryKind, outcome: Outcome) {
        self.items.push(ItemOutcome {
            path,
            kind,
            outcome,
        });
    }

    /// Record a non-fatal problem once
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    /// Whether any entry failed
    pub fn has_failures(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item.outcome, Outcome::Failed { .. }))
    }

    /// Number of entries that succeeded
    pub fn succeeded(&self) -> usize {
        self.items.len() - self.failed()
    }

    /// Number of entries that failed
    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, Outcome::Failed { .. }))
            .count()
    }
}
