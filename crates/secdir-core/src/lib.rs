//! Core engine for secdir
//!
//! Keeps a plaintext tree and a ciphertext tree consistent:
//!
//! - **Registry**: persistent mapping from plaintext path to ciphertext blob,
//!   plus run parameters and the watermark
//! - **Change detection**: classification of plaintext files and symlinks
//!   against the registry and the watermark
//! - **Encrypt / decrypt orchestration**: applying a change set through a
//!   [`secdir_gpg::Cipher`], and restoring a tree from the registry
//!
//! # Architecture
//!
//! ```text
//!              secdir-cli
//!                  |
//!             secdir-core
//!                  |
//!         +--------+--------+
//!         |                 |
//!     secdir-fs        secdir-gpg
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use secdir_core::{EncryptEngine, ParameterOverrides, Registry, RunConfig};
//! use secdir_gpg::GpgCipher;
//!
//! fn encrypt() -> secdir_core::Result<()> {
//!     let mut registry = Registry::open(Path::new("registry.toml"))?;
//!     let config = RunConfig::resolve(&registry.read_parameters()?, &ParameterOverrides::default())?;
//!     let cipher = GpgCipher::new(config.gpg_options());
//!     let report = EncryptEngine::new(&config, &cipher).run(&mut registry)?;
//!     println!("{} encrypted", report.succeeded());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detect;
pub mod error;
pub mod naming;
pub mod registry;
pub mod sync;

pub use config::{ParameterOverrides, RunConfig, StoredParameters};
pub use detect::{Change, ChangeDetector, ChangeSet, ChangeStatus, EntryKind};
pub use error::{Error, ErrorKind, Result};
pub use registry::{Registry, RegistryEntry, Snapshot};
pub use sync::{DecryptEngine, EncryptEngine, ItemOutcome, Outcome, RunReport, status};
