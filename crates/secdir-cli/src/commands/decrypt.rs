//! Decrypt command implementation

use colored::Colorize;
use secdir_core::{DecryptEngine, RunConfig, RunReport};
use secdir_gpg::{Cipher, GpgCipher};

use super::{fail_on_items, print_report};
use crate::context::RunContext;
use crate::error::Result;

/// Run the decrypt command with gpg
///
/// Without `passphrase` (flag or `SECDIR_PASSPHRASE`) the user is prompted
/// on the terminal.
pub fn run_decrypt(ctx: &RunContext, passphrase: Option<String>, json: bool) -> Result<()> {
    run_decrypt_with(ctx, passphrase, json, |config| {
        GpgCipher::new(config.gpg_options())
    })
    .map(|_| ())
}

/// Run the decrypt command with the cipher built by `make_cipher`
pub(crate) fn run_decrypt_with<C: Cipher>(
    ctx: &RunContext,
    passphrase: Option<String>,
    json: bool,
    make_cipher: impl FnOnce(&RunConfig) -> C,
) -> Result<RunReport> {
    let (registry, config) = ctx.open()?;
    let cipher = make_cipher(&config);

    let passphrase = match passphrase {
        Some(passphrase) => passphrase,
        None => rpassword::prompt_password(format!("Passphrase for {}: ", config.public_id))?,
    };

    if ctx.verbose && !json {
        println!(
            "{} Restoring {} from {}...",
            "=>".blue().bold(),
            config.plaindir.display().to_string().cyan(),
            config.securedir.display().to_string().cyan()
        );
    }
    let report = DecryptEngine::new(&config, &cipher).run(&registry, &passphrase)?;
    drop(registry);

    print_report(&report, json, ctx.verbose)?;
    fail_on_items(&report, "decrypt")?;
    Ok(report)
}
