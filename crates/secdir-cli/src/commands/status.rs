//! Status command implementation

use colored::Colorize;
use secdir_core::{ChangeSet, ChangeStatus};

use crate::context::RunContext;
use crate::error::Result;

/// Run the status command
pub fn run_status(ctx: &RunContext, json: bool) -> Result<()> {
    let (registry, config) = ctx.open()?;
    let changes = secdir_core::status(&config, &registry)?;
    drop(registry);

    if json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else {
        print!("{}", render(&changes));
    }
    Ok(())
}

fn render(changes: &ChangeSet) -> String {
    let mut out = String::new();
    if changes.is_empty() {
        out.push_str(&format!("{} Nothing to encrypt.\n", "OK".green().bold()));
    } else {
        out.push_str(&format!("{}\n", "Pending changes".bold()));
        for change in changes.iter() {
            let status = match change.status {
                ChangeStatus::Unseen => "new".green(),
                ChangeStatus::Changed => "modified".yellow(),
                ChangeStatus::Unchanged => "unchanged".dimmed(),
            };
            let target = change
                .target
                .as_deref()
                .map(|t| format!(" @ {}", t.dimmed()))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {:<10} {:<5} {}{}\n",
                status,
                change.kind.to_string(),
                change.path.to_string().cyan(),
                target
            ));
        }
    }
    for warning in &changes.warnings {
        out.push_str(&format!("{} {}\n", "warning:".yellow().bold(), warning));
    }
    out
}
