//! Init command implementation
//!
//! Creates the registry store, or updates the parameters of an existing one.

use colored::Colorize;
use secdir_core::{Registry, StoredParameters};

use crate::context::RunContext;
use crate::error::Result;

/// Run the init command
///
/// Overrides given on the command line are merged over whatever is already
/// stored; entries and the watermark are kept.
pub fn run_init(ctx: &RunContext) -> Result<()> {
    let stored = if ctx.registry_path.is_file() {
        Registry::open(&ctx.registry_path)?.raw_parameters().clone()
    } else {
        StoredParameters::default()
    };
    let parameters = ctx.overrides.apply_to(&stored);

    let registry = Registry::init(&ctx.registry_path, parameters)?;

    if ctx.verbose {
        let parameters = registry.raw_parameters();
        println!(
            "{} Registry initialized at {}",
            "OK".green().bold(),
            ctx.registry_path.display().to_string().cyan()
        );
        for (key, value) in [
            ("plaindir", &parameters.plaindir),
            ("securedir", &parameters.securedir),
            ("public_id", &parameters.public_id),
            ("gpg_binary", &parameters.gpg_binary),
            ("gpg_homedir", &parameters.gpg_homedir),
            ("gpg_keyring", &parameters.gpg_keyring),
        ] {
            if let Some(value) = value {
                println!("   {:<12} {}", key.dimmed(), value);
            }
        }
    }
    Ok(())
}
