//! Completion service layer for asak.
//!
//! # Architecture
//!
//! - [`traits::CompletionService`] — the narrow interface the selector dispatches through
//! - [`http_provider::HttpCompletionService`] — reqwest client for any OpenAI-compatible API
//! - [`stream`] — SSE decoding of streamed `chat.completion.chunk` events
//! - [`error::ProviderError`] — upstream failures, passed to callers unchanged

pub mod error;
pub mod http_provider;
pub mod stream;
pub mod traits;

// Re-export main types for convenience
pub use error::ProviderError;
pub use http_provider::HttpCompletionService;
pub use traits::{ChunkStream, Completion, CompletionService};
