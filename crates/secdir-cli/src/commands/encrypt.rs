//! Encrypt command implementation

use colored::Colorize;
use secdir_core::{EncryptEngine, RunConfig, RunReport};
use secdir_gpg::{Cipher, GpgCipher};

use super::{fail_on_items, print_report};
use crate::context::RunContext;
use crate::error::Result;

/// Run the encrypt command with gpg
pub fn run_encrypt(ctx: &RunContext, json: bool) -> Result<()> {
    run_encrypt_with(ctx, json, |config| GpgCipher::new(config.gpg_options())).map(|_| ())
}

/// Run the encrypt command with the cipher built by `make_cipher`
pub(crate) fn run_encrypt_with<C: Cipher>(
    ctx: &RunContext,
    json: bool,
    make_cipher: impl FnOnce(&RunConfig) -> C,
) -> Result<RunReport> {
    let (mut registry, config) = ctx.open()?;
    let cipher = make_cipher(&config);

    if ctx.verbose && !json {
        println!(
            "{} Encrypting {} into {}...",
            "=>".blue().bold(),
            config.plaindir.display().to_string().cyan(),
            config.securedir.display().to_string().cyan()
        );
    }
    let report = EncryptEngine::new(&config, &cipher).run(&mut registry)?;
    drop(registry);

    print_report(&report, json, ctx.verbose)?;
    fail_on_items(&report, "encrypt")?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secdir_core::ParameterOverrides;
    use secdir_test_utils::{FakeCipher, TestTree};

    fn context(tree: &TestTree) -> RunContext {
        RunContext {
            registry_path: tree.registry_path(),
            overrides: ParameterOverrides::default(),
            verbose: false,
        }
    }

    #[test]
    fn test_encrypt_without_registry_fails() {
        let tree = TestTree::new();

        let err = run_encrypt(&context(&tree), false).unwrap_err();
        assert!(err.to_string().contains("secdir init"));
    }

    #[test]
    fn test_encrypt_with_fake_cipher() {
        let tree = TestTree::new();
        tree.init_parameters("alice@example.com", 0);
        tree.write("a.txt", "alpha");
        let cipher = FakeCipher::new("alice@example.com", "pw");

        let report = run_encrypt_with(&context(&tree), false, |_| &cipher).unwrap();

        assert_eq!(report.succeeded(), 1);
        assert_eq!(tree.blobs().len(), 1);
    }

    #[test]
    fn test_encrypt_failure_is_an_error_after_the_run() {
        let tree = TestTree::new();
        tree.init_parameters("alice@example.com", 0);
        tree.write("a.txt", "alpha");
        tree.write("b.txt", "beta");
        let cipher = FakeCipher::new("alice@example.com", "pw");
        cipher.fail_on("a.txt");

        let err = run_encrypt_with(&context(&tree), false, |_| &cipher).unwrap_err();

        assert!(err.to_string().contains("1 of 2 entries failed"));
        assert_eq!(tree.blobs().len(), 1);
    }

    #[test]
    fn test_public_id_override_applies_to_new_rows() {
        let tree = TestTree::new();
        tree.init_parameters("alice@example.com", 0);
        tree.write("a.txt", "alpha");
        let mut ctx = context(&tree);
        ctx.overrides.public_id = Some("bob@example.com".into());
        let cipher = FakeCipher::new("bob@example.com", "pw");

        run_encrypt_with(&ctx, false, |_| &cipher).unwrap();

        let registry = secdir_core::Registry::open(&tree.registry_path()).unwrap();
        assert_eq!(registry.entries_for("bob@example.com").count(), 1);
        // The stored parameter is untouched
        assert_eq!(
            registry.read_parameters().unwrap().public_id.as_deref(),
            Some("alice@example.com")
        );
    }
}
