//! `asak init` — write a starter `~/.asak/config.json`.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use asak_core::config::save_config;
use asak_core::{Config, ModelSpec, ProviderConfig};

/// Run the init command. An existing config is left untouched.
pub fn run(config_path: &Path) -> Result<()> {
    println!();
    println!("{}", "⚡ asak — Setup".cyan().bold());
    println!();

    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        save_config(&starter_config(), Some(config_path))?;
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    }

    println!();
    println!(
        "{}",
        "Add your API keys (or set ASAK_PROVIDERS__<NAME>__KEY), then run `asak chat`.".dimmed()
    );
    println!();
    Ok(())
}

/// Two free-tier providers with conservative limits, keys left blank.
fn starter_config() -> Config {
    let mut providers = HashMap::new();
    providers.insert(
        "groq".to_string(),
        ProviderConfig::new("https://api.groq.com/openai/v1", ""),
    );
    providers.insert(
        "openrouter".to_string(),
        ProviderConfig::new("https://openrouter.ai/api/v1", ""),
    );

    Config {
        providers,
        models: vec![
            ModelSpec::new("groq", "llama-3.3-70b-versatile", 30, 1000),
            ModelSpec::new("groq", "llama-3.1-8b-instant", 30, 14400),
            ModelSpec::new("openrouter", "meta-llama/llama-3.3-70b-instruct:free", 20, 50),
        ],
    }
}
