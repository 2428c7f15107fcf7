//! Config loader — reads `~/.asak/config.json`, merges env vars, validates.
//!
//! # Loading precedence
//! 1. JSON file (default `~/.asak/config.json`)
//! 2. Environment variables `ASAK_PROVIDERS__<NAME>__KEY` / `ASAK_PROVIDERS__<NAME>__BASE_URL`
//!    (override JSON, only for providers the file already declares)
//!
//! Unlike most settings there is no usable default: a missing or invalid file is an error.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::schema::{Config, ConfigError};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load and validate configuration from `path` (or the default path) + env vars.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if !config_path.exists() {
        return Err(ConfigError::NotFound(config_path));
    }

    debug!("Loading config from {}", config_path.display());

    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Io {
        path: config_path.clone(),
        source,
    })?;

    let config = parse_config(&content)?;
    let config = apply_env_overrides(config, |name| std::env::var(name).ok());
    config.validate()?;
    Ok(config)
}

/// Parse a config document without touching the environment or validating.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(serde_json::from_str(content)?)
}

/// Save configuration to disk as pretty-printed JSON.
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let io_err = |source| ConfigError::Io {
        path: config_path.clone(),
        source,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&config_path, json).map_err(io_err)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply provider overrides using `lookup` to read variables.
///
/// Env var format: `ASAK_PROVIDERS__<NAME>__<FIELD>` where NAME is the provider
/// name upper-cased with `-` and `.` replaced by `_`.
fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    for (name, provider) in config.providers.iter_mut() {
        let env_name = env_segment(name);
        if let Some(val) = lookup(&format!("ASAK_PROVIDERS__{env_name}__KEY")) {
            debug!(provider = %name, "API key overridden from environment");
            provider.key = val;
        }
        if let Some(val) = lookup(&format!("ASAK_PROVIDERS__{env_name}__BASE_URL")) {
            debug!(provider = %name, base_url = %val, "base URL overridden from environment");
            provider.base_url = val;
        }
    }
    config
}

fn env_segment(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '-' | '.' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"{
        "providers": {
            "groq": {"base_url": "https://api.groq.com/openai/v1", "key": "gsk-file"},
            "open-router": {"base_url": "https://openrouter.ai/api/v1", "key": "sk-or-file"}
        },
        "models": [
            {"provider": "groq", "model": "llama-3.3-70b-versatile", "rate_limit": {"rpm": 30, "rpd": 1000}},
            {"provider": "open-router", "model": "qwen/qwen3:free", "rate_limit": {"rpm": 20, "rpd": 50}}
        ]
    }"#;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_file() {
        let file = write_temp_json(VALID);
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[1].provider, "open-router");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::NotFound(p)) if p == path
        ));
    }

    #[test]
    fn test_malformed_json() {
        let file = write_temp_json("{ not json");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected_on_load() {
        let file = write_temp_json(
            r#"{"providers": {"a": {"base_url": "x", "key": "k"}},
                "models": [{"provider": "b", "model": "m", "rate_limit": {"rpm": 1, "rpd": 1}}]}"#,
        );
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = parse_config(VALID).unwrap();
        let mut env = HashMap::new();
        env.insert("ASAK_PROVIDERS__GROQ__KEY", "gsk-env");
        env.insert(
            "ASAK_PROVIDERS__OPEN_ROUTER__BASE_URL",
            "http://localhost:9999/v1",
        );

        let config = apply_env_overrides(config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.providers["groq"].key, "gsk-env");
        assert_eq!(config.providers["groq"].base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.providers["open-router"].key, "sk-or-file");
        assert_eq!(
            config.providers["open-router"].base_url,
            "http://localhost:9999/v1"
        );
    }

    #[test]
    fn test_env_cannot_add_providers() {
        let config = parse_config(VALID).unwrap();
        let config = apply_env_overrides(config, |k| {
            (k == "ASAK_PROVIDERS__MISTRAL__KEY").then(|| "m-key".to_string())
        });
        assert!(!config.providers.contains_key("mistral"));
    }

    #[test]
    fn test_env_segment() {
        assert_eq!(env_segment("open-router"), "OPEN_ROUTER");
        assert_eq!(env_segment("api.example"), "API_EXAMPLE");
        assert_eq!(env_segment("groq"), "GROQ");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = parse_config(VALID).unwrap();

        save_config(&config, Some(&path)).unwrap();
        let loaded = parse_config(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded, config);
    }
}
