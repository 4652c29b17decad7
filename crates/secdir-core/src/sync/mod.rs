//! Encrypt and decrypt orchestration
//!
//! This module provides:
//! - **encrypt**: Encrypt new and modified plaintext entries
//! - **decrypt**: Restore the plaintext tree from the registry
//! - **status**: Preview what the next encrypt run would do

mod decrypt;
mod encrypt;
mod report;
mod status;

pub use decrypt::DecryptEngine;
pub use encrypt::EncryptEngine;
pub use report::{ItemOutcome, Outcome, RunReport};
pub use status::status;
