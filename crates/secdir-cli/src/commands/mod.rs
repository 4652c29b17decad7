//! Command implementations for secdir-cli

pub mod decrypt;
pub mod encrypt;
pub mod init;
pub mod list;
pub mod status;

pub use decrypt::run_decrypt;
pub use encrypt::run_encrypt;
pub use init::run_init;
pub use list::run_list;
pub use status::run_status;

use colored::Colorize;
use secdir_core::{Outcome, RunReport};

use crate::error::{CliError, Result};

/// Print a run report, either as JSON or as a colored summary.
///
/// The summary is only shown in verbose mode; quiet runs print nothing on
/// success.
pub(crate) fn print_report(report: &RunReport, json: bool, verbose: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    if !verbose {
        return Ok(());
    }

    for item in &report.items {
        match &item.outcome {
            Outcome::Encrypted {
                ciphertext_name,
                replaced,
            } => {
                let marker = if *replaced { "~".yellow() } else { "+".green() };
                println!("   {} {} -> {}", marker, item.path.to_string().cyan(), ciphertext_name.dimmed());
            }
            Outcome::LinkRegistered { target } | Outcome::LinkRestored { target } => {
                println!("   {} {} @ {}", "+".green(), item.path.to_string().cyan(), target.dimmed());
            }
            Outcome::Decrypted => {
                println!("   {} {}", "+".green(), item.path.to_string().cyan());
            }
            Outcome::Failed { error } => {
                println!("   {} {}: {}", "!".red(), item.path.to_string().cyan(), error);
            }
        }
    }
    for warning in &report.warnings {
        println!("   {} {}", "warning:".yellow().bold(), warning);
    }

    let summary = format!(
        "{} succeeded, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped
    );
    if report.has_failures() {
        println!("{} {}", "ERROR".red().bold(), summary);
    } else {
        println!("{} {}", "OK".green().bold(), summary);
    }
    Ok(())
}

/// Turn failed entries into a non-zero exit once the run has finished.
pub(crate) fn fail_on_items(report: &RunReport, action: &str) -> Result<()> {
    if report.has_failures() {
        return Err(CliError::user(format!(
            "{} of {} entries failed to {action}",
            report.failed(),
            report.items.len()
        )));
    }
    Ok(())
}
