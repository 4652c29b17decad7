//! Shared test utilities for the secdir workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tree`] - [`tree::TestTree`], a temporary plaintext/ciphertext tree pair
//! - [`cipher`] - [`cipher::FakeCipher`], a deterministic cipher for engine tests

pub mod cipher;
pub mod tree;

pub use cipher::FakeCipher;
pub use tree::TestTree;
