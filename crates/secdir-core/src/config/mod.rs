//! Run parameters and their resolution
//!
//! Parameters come from two places, later overriding earlier:
//!
//! 1. **Stored parameters** - the `[parameters]` table of the registry
//! 2. **Overrides** - values supplied by the caller for this run only
//!
//! Path-like values are tilde-expanded during resolution. The result is an
//! immutable [`RunConfig`] handed to every component of the run.

mod parameters;
mod resolver;

pub use parameters::{ParameterOverrides, StoredParameters};
pub use resolver::RunConfig;
