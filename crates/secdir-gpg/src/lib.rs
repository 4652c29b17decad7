//! Encryption collaborator for secdir
//!
//! The sync engine never touches key material. It hands a plaintext path and
//! a ciphertext path to a [`Cipher`] and trusts it to do the transform. The
//! shipped implementation, [`GpgCipher`], shells out to a `gpg` binary.

pub mod cipher;
pub mod error;
pub mod gpg;

pub use cipher::Cipher;
pub use error::{Error, Result};
pub use gpg::{GpgCipher, GpgOptions};
