//! Configuration schema — providers (endpoint + credential) and the ordered
//! list of rate-limited models routed across them.
//!
//! JSON on disk uses the same snake_case keys as the Rust fields:
//!
//! ```json
//! {
//!   "providers": { "groq": { "base_url": "https://api.groq.com/openai/v1", "key": "gsk-..." } },
//!   "models": [
//!     { "provider": "groq", "model": "llama-3.3-70b-versatile", "rate_limit": { "rpm": 30, "rpd": 1000 } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration. Immutable once handed to a selector.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Upstream endpoints keyed by provider name.
    pub providers: HashMap<String, ProviderConfig>,
    /// Routable models. Position in this list is the model's index everywhere else.
    pub models: Vec<ModelSpec>,
}

impl Config {
    /// Check every invariant; the first violation wins.
    ///
    /// - at least one provider and one model
    /// - every model references a declared provider
    /// - `rpm` and `rpd` are positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        if self.models.is_empty() {
            return Err(ConfigError::NoModels);
        }

        for (index, spec) in self.models.iter().enumerate() {
            if !self.providers.contains_key(&spec.provider) {
                return Err(ConfigError::UnknownProvider {
                    index,
                    provider: spec.provider.clone(),
                });
            }
            if spec.rate_limit.rpm == 0 {
                return Err(ConfigError::InvalidRateLimit {
                    index,
                    field: "rpm",
                });
            }
            if spec.rate_limit.rpd == 0 {
                return Err(ConfigError::InvalidRateLimit {
                    index,
                    field: "rpd",
                });
            }
        }

        Ok(())
    }

    /// Provider entry for a model, if the model index and its provider exist.
    pub fn provider_for(&self, index: usize) -> Option<(&ModelSpec, &ProviderConfig)> {
        let spec = self.models.get(index)?;
        let provider = self.providers.get(&spec.provider)?;
        Some((spec, provider))
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// An upstream OpenAI-compatible endpoint and its credential.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    pub base_url: String,
    /// API key sent as a bearer token.
    pub key: String,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        ProviderConfig {
            base_url: base_url.into(),
            key: key.into(),
        }
    }

    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.key.is_empty()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("key", &if self.key.is_empty() { "" } else { "***" })
            .finish()
    }
}

// ─────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────

/// One routable model on a provider, with its request quotas.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ModelSpec {
    /// Name of a key in [`Config::providers`].
    pub provider: String,
    /// Model identifier sent upstream.
    pub model: String,
    pub rate_limit: RateLimit,
}

impl ModelSpec {
    pub fn new(provider: impl Into<String>, model: impl Into<String>, rpm: u32, rpd: u32) -> Self {
        ModelSpec {
            provider: provider.into(),
            model: model.into(),
            rate_limit: RateLimit { rpm, rpd },
        }
    }
}

/// Requests-per-minute and requests-per-day ceilings.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimit {
    pub rpm: u32,
    pub rpd: u32,
}

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Reasons a configuration is rejected as a whole.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config declares no providers")]
    NoProviders,

    #[error("config declares no models")]
    NoModels,

    #[error("model #{index} references unknown provider '{provider}'")]
    UnknownProvider { index: usize, provider: String },

    #[error("model #{index} has a non-positive rate_limit.{field}")]
    InvalidRateLimit { index: usize, field: &'static str },

    #[error("config file not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
