//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secdir_core::ParameterOverrides;

/// secdir - Keep an encrypted mirror of a directory tree
#[derive(Parser, Debug)]
#[command(name = "secdir")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry store holding parameters and entries
    #[arg(
        long,
        global = true,
        env = "SECDIR_REGISTRY",
        default_value = "registry.toml"
    )]
    pub registry: PathBuf,

    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Per-run overrides of stored parameters
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideArgs {
    /// Root of the plaintext tree
    #[arg(long, global = true)]
    pub plaindir: Option<String>,

    /// Root of the ciphertext tree
    #[arg(long, global = true)]
    pub securedir: Option<String>,

    /// Recipient key id or email
    #[arg(long, global = true)]
    pub public_id: Option<String>,

    /// Public keyring passed to gpg
    #[arg(long, global = true)]
    pub gpg_keyring: Option<String>,

    /// gpg home directory
    #[arg(long, global = true)]
    pub gpg_homedir: Option<String>,

    /// gpg executable
    #[arg(long, global = true)]
    pub gpg_binary: Option<String>,
}

impl From<OverrideArgs> for ParameterOverrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            plaindir: args.plaindir,
            securedir: args.securedir,
            public_id: args.public_id,
            gpg_keyring: args.gpg_keyring,
            gpg_homedir: args.gpg_homedir,
            gpg_binary: args.gpg_binary,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the registry or update its stored parameters
    ///
    /// Parameters given as flags are stored; missing ones keep their stored
    /// value. plaindir, securedir and public-id must end up set.
    ///
    /// Examples:
    ///   secdir init --plaindir ~/plain --securedir ~/secure --public-id alice@example.com
    ///   secdir --registry ~/.secdir.toml init --gpg-homedir ~/.gnupg
    Init,

    /// Encrypt new and modified plaintext entries
    Encrypt {
        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore the plaintext tree from the ciphertext tree
    Decrypt {
        /// Passphrase for the secret key (prompted for when absent)
        #[arg(long, env = "SECDIR_PASSPHRASE", hide_env_values = true)]
        passphrase: Option<String>,

        /// Output the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what the next encrypt run would do
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List registered entries
    List {
        /// Include entries of every recipient
        #[arg(long)]
        all: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}
