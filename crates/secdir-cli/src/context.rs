//! Per-invocation context shared by all commands

use std::path::PathBuf;

use secdir_core::{ParameterOverrides, Registry, RunConfig};

/// Where the registry lives and what the caller overrode
#[derive(Debug, Clone)]
pub struct RunContext {
    pub registry_path: PathBuf,
    pub overrides: ParameterOverrides,
    pub verbose: bool,
}

impl RunContext {
    /// Acquire the registry and resolve the run configuration.
    ///
    /// The registry stays locked for as long as the returned value lives.
    pub fn open(&self) -> secdir_core::Result<(Registry, RunConfig)> {
        let registry = Registry::open(&self.registry_path)?;
        let config = RunConfig::resolve(registry.raw_parameters(), &self.overrides)?;
        Ok((registry, config))
    }
}
