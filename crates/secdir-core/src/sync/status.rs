//! Read-only preview of an encrypt run

use crate::Result;
use crate::config::RunConfig;
use crate::detect::{ChangeDetector, ChangeSet};
use crate::registry::Registry;

/// Classify the plaintext tree against the stored watermark.
///
/// Reports what the next encrypt run would act on without touching the
/// registry or either tree.
pub fn status(config: &RunConfig, registry: &Registry) -> Result<ChangeSet> {
    let snapshot = registry.snapshot();
    ChangeDetector::new(&config.plaindir, &snapshot, registry.watermark()).classify()
}
