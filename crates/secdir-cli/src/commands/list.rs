//! List command implementation

use colored::Colorize;
use secdir_core::RegistryEntry;
use secdir_fs::NormalizedPath;
use serde::Serialize;

use crate::context::RunContext;
use crate::error::Result;

#[derive(Serialize)]
struct ListedEntry<'a> {
    path: &'a NormalizedPath,
    #[serde(flatten)]
    entry: &'a RegistryEntry,
}

/// Run the list command
///
/// Shows entries registered for the configured recipient, or every entry
/// with `all`.
pub fn run_list(ctx: &RunContext, all: bool, json: bool) -> Result<()> {
    let (registry, config) = ctx.open()?;
    let snapshot = registry.snapshot();
    drop(registry);

    let entries: Vec<ListedEntry<'_>> = snapshot
        .iter()
        .filter(|(_, entry)| all || entry.recipient_id == config.public_id)
        .map(|(path, entry)| ListedEntry { path, entry })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No entries registered.".dimmed());
        return Ok(());
    }
    for ListedEntry { path, entry } in &entries {
        let detail = match &entry.link_target {
            Some(target) if entry.is_link => format!("@ {target}"),
            _ => entry.ciphertext_name.clone(),
        };
        if all {
            println!(
                "  {} {} ({})",
                path.to_string().cyan(),
                detail.dimmed(),
                entry.recipient_id
            );
        } else {
            println!("  {} {}", path.to_string().cyan(), detail.dimmed());
        }
    }
    Ok(())
}
