//! Completion service trait — the narrow seam between model selection and
//! the HTTP transport.
//!
//! `HttpCompletionService` in `http_provider.rs` covers every OpenAI-compatible API;
//! tests substitute in-memory implementations.

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use asak_core::types::{ChatCompletion, ChatCompletionChunk, ChatCompletionRequest};

use crate::error::ProviderError;

/// Forward-only stream of decoded chunks from a streaming completion.
pub type ChunkStream = BoxStream<'static, Result<ChatCompletionChunk, ProviderError>>;

/// Result of a chat completion call, shaped by `request.stream`.
pub enum Completion {
    /// A finished, non-streamed completion.
    Full(ChatCompletion),
    /// Chunks of a streamed completion, in arrival order.
    Stream(ChunkStream),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Full(c) => f.debug_tuple("Full").field(c).finish(),
            Completion::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Anything able to run a chat completion against an endpoint.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send `request` to the OpenAI-compatible API at `base_url`, authenticating with `api_key`.
    ///
    /// Returns [`Completion::Stream`] when `request.stream` is true and
    /// [`Completion::Full`] otherwise. Errors are reported as-is; no retries happen here.
    async fn create_chat_completion(
        &self,
        base_url: &str,
        api_key: &str,
        request: ChatCompletionRequest,
    ) -> Result<Completion, ProviderError>;
}
