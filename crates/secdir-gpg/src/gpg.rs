//! Subprocess execution of the gpg binary
//!
//! Wraps `gpg --encrypt` / `gpg --decrypt` invocations, feeding the
//! passphrase over stdin and translating exit status into [`Error`].

use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::cipher::Cipher;
use crate::error::{Error, Result};

/// Where to find gpg and which keys to use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpgOptions {
    /// The gpg executable, looked up on `PATH` if not absolute
    pub binary: PathBuf,
    /// Passed as `--homedir` when set
    pub homedir: Option<PathBuf>,
    /// Passed as `--keyring` (with `--no-default-keyring`) when set
    pub keyring: Option<String>,
    /// Recipient key id or email used for encryption
    pub recipient: String,
}

impl GpgOptions {
    /// Options using `gpg` from `PATH` and its default home and keyring.
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from("gpg"),
            homedir: None,
            keyring: None,
            recipient: recipient.into(),
        }
    }
}

/// [`Cipher`] backed by the gpg command-line tool
#[derive(Debug, Clone)]
pub struct GpgCipher {
    options: GpgOptions,
}

impl GpgCipher {
    pub fn new(options: GpgOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GpgOptions {
        &self.options
    }

    fn common_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if let Some(homedir) = &self.options.homedir {
            args.push("--homedir".into());
            args.push(homedir.into());
        }
        args.push("--batch".into());
        args.push("--yes".into());
        args
    }

    /// Arguments for encrypting `plaintext` into `ciphertext`
    pub fn encrypt_args(&self, plaintext: &Path, ciphertext: &Path) -> Vec<OsString> {
        let mut args = self.common_args();
        if let Some(keyring) = &self.options.keyring {
            args.push("--no-default-keyring".into());
            args.push("--keyring".into());
            args.push(keyring.into());
        }
        let tail: [OsString; 8] = [
            "--trust-model".into(),
            "always".into(),
            "--recipient".into(),
            self.options.recipient.as_str().into(),
            "--output".into(),
            ciphertext.into(),
            "--encrypt".into(),
            plaintext.into(),
        ];
        args.extend(tail);
        args
    }

    /// Arguments for decrypting `ciphertext` into `plaintext`
    ///
    /// The passphrase itself is never on the command line; it is written to
    /// stdin and picked up through `--passphrase-fd 0`.
    pub fn decrypt_args(&self, ciphertext: &Path, plaintext: &Path) -> Vec<OsString> {
        let mut args = self.common_args();
        let tail: [OsString; 8] = [
            "--pinentry-mode".into(),
            "loopback".into(),
            "--passphrase-fd".into(),
            "0".into(),
            "--output".into(),
            plaintext.into(),
            "--decrypt".into(),
            ciphertext.into(),
        ];
        args.extend(tail);
        args
    }

    fn run(&self, args: Vec<OsString>, stdin: Option<&str>) -> Result<()> {
        let mut cmd = Command::new(&self.options.binary);
        cmd.args(&args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        tracing::debug!(binary = %self.options.binary.display(), ?args, "Running gpg");

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::BinaryNotFound {
                path: self.options.binary.clone(),
            },
            _ => Error::Io(e),
        })?;

        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            // gpg may exit before reading; a broken pipe then shows up as a
            // failed exit status below, which carries the useful stderr.
            if let Err(e) = pipe.write_all(format!("{input}\n").as_bytes())
                && e.kind() != ErrorKind::BrokenPipe
            {
                return Err(Error::Io(e));
            }
        }

        let output = child.wait_with_output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);
            Err(Error::CommandFailed { code, stderr })
        }
    }
}

impl Cipher for GpgCipher {
    fn encrypt(&self, plaintext: &Path, ciphertext: &Path) -> Result<()> {
        if !plaintext.exists() {
            return Err(Error::InputMissing {
                path: plaintext.to_path_buf(),
            });
        }
        self.run(self.encrypt_args(plaintext, ciphertext), None)
    }

    fn decrypt(&self, ciphertext: &Path, plaintext: &Path, passphrase: &str) -> Result<()> {
        if !ciphertext.exists() {
            return Err(Error::InputMissing {
                path: ciphertext.to_path_buf(),
            });
        }
        self.run(self.decrypt_args(ciphertext, plaintext), Some(passphrase))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_encrypt_args_minimal() {
        let gpg = GpgCipher::new(GpgOptions::new("alice@example.com"));
        let args = strings(gpg.encrypt_args(Path::new("/p/a.txt"), Path::new("/s/uuid")));

        assert_eq!(
            args,
            vec![
                "--batch",
                "--yes",
                "--trust-model",
                "always",
                "--recipient",
                "alice@example.com",
                "--output",
                "/s/uuid",
                "--encrypt",
                "/p/a.txt",
            ]
        );
    }

    #[test]
    fn test_encrypt_args_with_homedir_and_keyring() {
        let gpg = GpgCipher::new(GpgOptions {
            binary: PathBuf::from("/usr/bin/gpg2"),
            homedir: Some(PathBuf::from("/home/alice/.gnupg")),
            keyring: Some("pubring.kbx".to_string()),
            recipient: "ABCD1234".to_string(),
        });
        let args = strings(gpg.encrypt_args(Path::new("in"), Path::new("out")));

        assert_eq!(&args[..2], &["--homedir", "/home/alice/.gnupg"]);
        let keyring_at = args.iter().position(|a| a == "--keyring").unwrap();
        assert_eq!(args[keyring_at - 1], "--no-default-keyring");
        assert_eq!(args[keyring_at + 1], "pubring.kbx");
    }

    #[test]
    fn test_decrypt_args_keep_passphrase_off_command_line() {
        let gpg = GpgCipher::new(GpgOptions::new("alice@example.com"));
        let args = strings(gpg.decrypt_args(Path::new("/s/uuid"), Path::new("/p/a.txt")));

        assert!(args.contains(&"--passphrase-fd".to_string()));
        assert!(!args.iter().any(|a| a.contains("secret")));
        assert_eq!(&args[args.len() - 2..], &["--decrypt", "/s/uuid"]);
        // Decryption picks the key from the message, not a recipient flag
        assert!(!args.contains(&"--recipient".to_string()));
    }

    #[test]
    fn test_missing_binary_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let input = temp.path().join("a.txt");
        std::fs::write(&input, "hello").unwrap();

        let gpg = GpgCipher::new(GpgOptions {
            binary: temp.path().join("no-such-gpg"),
            ..GpgOptions::new("alice@example.com")
        });
        let result = gpg.encrypt(&input, &temp.path().join("out"));

        assert!(matches!(result, Err(Error::BinaryNotFound { .. })));
    }

    #[test]
    fn test_missing_input_is_reported_before_spawning() {
        let temp = tempfile::TempDir::new().unwrap();
        let gpg = GpgCipher::new(GpgOptions::new("alice@example.com"));

        let result = gpg.decrypt(&temp.path().join("gone"), &temp.path().join("out"), "pw");

        assert!(matches!(result, Err(Error::InputMissing { .. })));
    }
}
