//! The collaborator seam between the sync engine and the crypto backend

use std::path::Path;

use crate::Result;

/// Encrypts and decrypts whole files.
///
/// Implementations are expected to write `output` completely or fail; the
/// engine commits registry rows only after a successful return. Calls block
/// until the transform finishes and are never cancelled.
pub trait Cipher {
    /// Encrypt `plaintext` into `ciphertext` for the configured recipient.
    fn encrypt(&self, plaintext: &Path, ciphertext: &Path) -> Result<()>;

    /// Decrypt `ciphertext` into `plaintext` using `passphrase`.
    fn decrypt(&self, ciphertext: &Path, plaintext: &Path, passphrase: &str) -> Result<()>;
}

impl<C: Cipher + ?Sized> Cipher for &C {
    fn encrypt(&self, plaintext: &Path, ciphertext: &Path) -> Result<()> {
        (**self).encrypt(plaintext, ciphertext)
    }

    fn decrypt(&self, ciphertext: &Path, plaintext: &Path, passphrase: &str) -> Result<()> {
        (**self).decrypt(ciphertext, plaintext, passphrase)
    }
}

impl<C: Cipher + ?Sized> Cipher for Box<C> {
    fn encrypt(&self, plaintext: &Path, ciphertext: &Path) -> Result<()> {
        (**self).encrypt(plaintext, ciphertext)
    }

    fn decrypt(&self, ciphertext: &Path, plaintext: &Path, passphrase: &str) -> Result<()> {
        (**self).decrypt(ciphertext, plaintext, passphrase)
    }
}
