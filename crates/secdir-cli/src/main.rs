//! secdir CLI
//!
//! Mirrors a plaintext directory tree into an encrypted one and back.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::RunContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let ctx = RunContext {
        registry_path: cli.registry,
        overrides: cli.overrides.into(),
        verbose: cli.verbose,
    };

    match cli.command {
        Some(cmd) => execute_command(&ctx, cmd),
        None => {
            println!("{} Encrypted directory mirror", "secdir".green().bold());
            println!();
            println!("Run {} for available commands.", "secdir --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(ctx: &RunContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => commands::run_init(ctx),
        Commands::Encrypt { json } => commands::run_encrypt(ctx, json),
        Commands::Decrypt { passphrase, json } => commands::run_decrypt(ctx, passphrase, json),
        Commands::Status { json } => commands::run_status(ctx, json),
        Commands::List { all, json } => commands::run_list(ctx, all, json),
    }
}
