//! `asak status` — show configuration, providers and per-model quota usage.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use asak_core::utils::mask_secret;
use asak_core::ModelSpec;
use asak_router::UsageRecord;

use crate::helpers::format_headroom;

/// Run the status command.
pub fn run(config_path: &Path, usage_path: &Path) -> Result<()> {
    println!();
    println!("{}", "⚡ asak Status".cyan().bold());
    println!();

    let config_exists = config_path.exists();
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_exists {
            "✓".green().to_string()
        } else {
            "(not found)".red().to_string()
        }
    );
    println!(
        "  {:<18} {} {}",
        "Usage:".bold(),
        usage_path.display(),
        if usage_path.exists() {
            "✓".green().to_string()
        } else {
            "(none yet)".dimmed().to_string()
        }
    );

    if !config_exists {
        println!();
        println!("  Run {} to create one.", "asak init".bold());
        println!();
        return Ok(());
    }

    let selector = crate::build_selector(config_path, usage_path)?;
    let config = selector.config();

    // Providers
    println!();
    println!("  {}", "Providers:".bold());
    let mut names: Vec<&String> = config.providers.keys().collect();
    names.sort();
    for name in names {
        let provider = &config.providers[name];
        let key = if provider.is_configured() {
            format!("{} ({})", "✓".green(), mask_secret(&provider.key))
        } else {
            format!("{}", "· no key".dimmed())
        };
        println!("    {:<20} {:<40} {}", name, provider.base_url, key);
    }

    // Models
    println!();
    println!("  {}", "Models:".bold());
    let records = selector.recorder().get();
    for (index, (spec, record)) in config.models.iter().zip(&records).enumerate() {
        let mark = if record.is_available() {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("    {} {}", mark, model_row(index, spec, record));
    }

    println!();

    Ok(())
}

/// `[i] provider/model  min a/b  day c/d  headroom n%`, uncolored.
fn model_row(index: usize, spec: &ModelSpec, record: &UsageRecord) -> String {
    format!(
        "[{index}] {:<40} min {:>4}/{:<4} day {:>6}/{:<6} headroom {}",
        format!("{}/{}", spec.provider, spec.model),
        record.minute_events().len(),
        record.limit_m(),
        record.day_events().len(),
        record.limit_d(),
        format_headroom(record.availability()),
    )
}
