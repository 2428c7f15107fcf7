//! Core types for asak — chat wire format, configuration, and shared helpers.
//!
//! # Modules
//!
//! - [`types`] — OpenAI-compatible request, response, and stream chunk types
//! - [`config`] — `Config` schema, validation, and the JSON/env loader
//! - [`utils`] — data directory and clock helpers

pub mod config;
pub mod types;
pub mod utils;

pub use config::{Config, ConfigError, ModelSpec, ProviderConfig, RateLimit};
pub use types::{ChatCompletion, ChatCompletionChunk, ChatCompletionRequest, Message};
