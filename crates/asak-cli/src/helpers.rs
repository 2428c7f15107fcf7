//! Shared CLI helpers — path expansion, selection printing, REPL banner.

use std::path::PathBuf;

use colored::Colorize;

use asak_core::utils::mask_secret;
use asak_router::{ModelFilter, RouterError, SelectedModel};

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a reserved model, key masked.
pub fn print_selection(selected: &SelectedModel) {
    println!();
    println!("{}", "⚡ Selected model".cyan().bold());
    println!("  {:<12} {}", "Index:".bold(), selected.index);
    println!("  {:<12} {}", "Provider:".bold(), selected.provider);
    println!("  {:<12} {}", "Model:".bold(), selected.model);
    println!("  {:<12} {}", "Base URL:".bold(), selected.base_url);
    println!("  {:<12} {}", "Key:".bold(), mask_secret(&selected.key).dimmed());
    println!();
}

/// One-line "who answered" header printed before a reply.
pub fn reply_header(selected: &SelectedModel) -> String {
    format!("{} · {}", selected.model, selected.provider)
}

/// Headroom as a whole percentage, clamped to `0..=100`.
pub fn format_headroom(score: f64) -> String {
    format!("{:.0}%", (score * 100.0).clamp(0.0, 100.0))
}

/// Human description of which models a filter admits.
pub fn filter_scope(filter: &ModelFilter) -> String {
    if filter.is_any() {
        "all models".to_string()
    } else {
        filter.to_string()
    }
}

/// Extra advice for errors a user can act on.
pub fn error_hint(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<RouterError>() {
        Some(e) if e.is_quota_exhausted() => {
            Some("every matching model is at its rate limit; wait a moment or widen --filter")
        }
        _ => None,
    }
}

/// Print an error, followed by a hint when one applies.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("\n❌ Error: {err}");
    if let Some(hint) = error_hint(err) {
        eprintln!("   {}", hint.dimmed());
    }
    eprintln!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(mode: &str, filter: &ModelFilter) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "⚡ asak".cyan().bold(), version.dimmed());
    let scope = filter_scope(filter);
    println!("{}", format!("mode: {mode} | filter: {scope}").dimmed());
    println!(
        "{}",
        "Type a message, \"/reset\" to clear history, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-streamed replies).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
