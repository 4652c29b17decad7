//! Deterministic [`Cipher`] stand-in.
//!
//! "Encrypts" by prefixing the plaintext with a header naming the recipient,
//! so tests can check which identity a blob was written for without gpg.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use secdir_gpg::{Cipher, Error, Result};

const HEADER: &str = "FAKE:";

/// A [`Cipher`] that keeps content readable and counts its calls.
pub struct FakeCipher {
    recipient: String,
    passphrase: String,
    failing: RefCell<HashSet<String>>,
    encrypt_calls: Cell<usize>,
    decrypt_calls: Cell<usize>,
}

impl FakeCipher {
    pub fn new(recipient: &str, passphrase: &str) -> Self {
        Self {
            recipient: recipient.to_string(),
            passphrase: passphrase.to_string(),
            failing: RefCell::new(HashSet::new()),
            encrypt_calls: Cell::new(0),
            decrypt_calls: Cell::new(0),
        }
    }

    /// Make encryption of any file named `file_name` fail after writing a
    /// partial output.
    pub fn fail_on(&self, file_name: &str) {
        self.failing.borrow_mut().insert(file_name.to_string());
    }

    /// Let `file_name` encrypt normally again.
    pub fn heal(&self, file_name: &str) {
        self.failing.borrow_mut().remove(file_name);
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.get()
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.get()
    }

    /// Recipient a blob was written for, read from its header.
    pub fn recipient_of(blob: &Path) -> Option<String> {
        let content = fs::read_to_string(blob).ok()?;
        let header = content.lines().next()?;
        header.strip_prefix(HEADER).map(str::to_string)
    }

    fn should_fail(&self, plaintext: &Path) -> bool {
        plaintext
            .file_name()
            .map(|n| self.failing.borrow().contains(n.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }
}

impl Cipher for FakeCipher {
    fn encrypt(&self, plaintext: &Path, ciphertext: &Path) -> Result<()> {
        self.encrypt_calls.set(self.encrypt_calls.get() + 1);
        if !plaintext.exists() {
            return Err(Error::InputMissing {
                path: plaintext.to_path_buf(),
            });
        }
        if self.should_fail(plaintext) {
            fs::write(ciphertext, b"partial")?;
            return Err(Error::CommandFailed {
                code: 2,
                stderr: "encryption failed".to_string(),
            });
        }

        let mut content = format!("{HEADER}{}\n", self.recipient).into_bytes();
        content.extend(fs::read(plaintext)?);
        fs::write(ciphertext, content)?;
        Ok(())
    }

    fn decrypt(&self, ciphertext: &Path, plaintext: &Path, passphrase: &str) -> Result<()> {
        self.decrypt_calls.set(self.decrypt_calls.get() + 1);
        if !ciphertext.exists() {
            return Err(Error::InputMissing {
                path: ciphertext.to_path_buf(),
            });
        }
        if passphrase != self.passphrase {
            return Err(Error::CommandFailed {
                code: 2,
                stderr: "Bad passphrase".to_string(),
            });
        }

        let content = fs::read(ciphertext)?;
        let body = content
            .iter()
            .position(|b| *b == b'\n')
            .filter(|_| content.starts_with(HEADER.as_bytes()))
            .map(|newline| &content[newline + 1..])
            .ok_or_else(|| Error::CommandFailed {
                code: 2,
                stderr: "no valid OpenPGP data found".to_string(),
            })?;
        fs::write(plaintext, body)?;
        Ok(())
    }
}
