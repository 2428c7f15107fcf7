//! Configuration system — schema, validation, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use asak_core::config;
//!
//! let cfg = config::load_config(None)?;
//! println!("{} models", cfg.models.len());
//! # Ok::<(), asak_core::config::ConfigError>(())
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, parse_config, save_config};
pub use schema::{Config, ConfigError, ModelSpec, ProviderConfig, RateLimit};
