//! `asak usage` — export, import, merge and reset the usage snapshot.
//!
//! The snapshot lives at `~/.asak/usage.json` by default. Every command that
//! reserves quota restores it first and writes it back afterwards, so separate
//! invocations share one set of rolling windows.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use tracing::{debug, warn};

use asak_router::{parse_snapshot, Selector, UsageRecord};

use crate::helpers;

#[derive(Subcommand, Debug)]
pub enum UsageCommands {
    /// Print the current snapshot as JSON, or write it to a file
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<String>,
    },

    /// Replace the current snapshot with the one in PATH
    Import {
        /// Snapshot file produced by `asak usage export`
        path: String,
    },

    /// Add the events recorded in PATH to the current snapshot
    Merge {
        /// Snapshot file produced by another machine or process
        path: String,
    },

    /// Forget all recorded usage
    Reset,
}

/// Dispatch a usage subcommand against `selector`, persisting to `usage_path`.
pub fn dispatch(action: UsageCommands, selector: &Selector, usage_path: &Path) -> Result<()> {
    match action {
        UsageCommands::Export { out } => {
            let json = export_json(selector)?;
            match out {
                Some(out) => {
                    let path = helpers::expand_tilde(&out);
                    write_file(&path, &json)?;
                    println!("  {} exported usage to {}", "✓".green(), path.display());
                }
                None => println!("{json}"),
            }
        }
        UsageCommands::Import { path } => {
            let records = read_snapshot(&helpers::expand_tilde(&path))?;
            selector.recorder().replace(records)?;
            save(selector, usage_path)?;
            println!("  {} usage replaced from {}", "✓".green(), path);
        }
        UsageCommands::Merge { path } => {
            let records = read_snapshot(&helpers::expand_tilde(&path))?;
            selector.recorder().add(&records)?;
            save(selector, usage_path)?;
            println!("  {} usage merged from {}", "✓".green(), path);
        }
        UsageCommands::Reset => {
            selector.recorder().replace(empty_records(selector))?;
            save(selector, usage_path)?;
            println!("  {} usage reset", "✓".green());
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────

/// Load the persisted snapshot into `selector`.
///
/// A missing file means no prior usage. A snapshot that fails to parse or no
/// longer matches the configured models is ignored with a warning.
pub fn restore(selector: &Selector, usage_path: &Path) {
    if !usage_path.exists() {
        debug!("no usage snapshot at {}", usage_path.display());
        return;
    }

    let restored = read_snapshot(usage_path)
        .and_then(|records| selector.recorder().replace(records).map_err(anyhow::Error::from));

    match restored {
        Ok(()) => debug!("restored usage from {}", usage_path.display()),
        Err(e) => warn!(
            "ignoring usage snapshot at {}: {e:#}",
            usage_path.display()
        ),
    }
}

/// Write the selector's current (compacted) usage to `usage_path`.
pub fn save(selector: &Selector, usage_path: &Path) -> Result<()> {
    let json = export_json(selector)?;
    write_file(usage_path, &json)?;
    debug!("saved usage to {}", usage_path.display());
    Ok(())
}

fn export_json(selector: &Selector) -> Result<String> {
    Ok(serde_json::to_string_pretty(&selector.recorder().get())?)
}

fn read_snapshot(path: &Path) -> Result<Vec<UsageRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(parse_snapshot(&content)?)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn empty_records(selector: &Selector) -> Vec<UsageRecord> {
    selector
        .config()
        .models
        .iter()
        .map(|m| UsageRecord::new(m.rate_limit.rpm, m.rate_limit.rpd))
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
