//! Generic HTTP completion service for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint (OpenAI, OpenRouter, Groq,
//! DeepSeek, Gemini's OpenAI shim, vLLM, Ollama...). The endpoint and key are
//! supplied per call, so a single instance (and its connection pool) serves
//! every configured provider.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use asak_core::types::{ChatCompletion, ChatCompletionRequest};

use crate::error::ProviderError;
use crate::stream::decode_sse;
use crate::traits::{Completion, CompletionService};

/// Whole-request timeout, including reading a streamed body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// ─────────────────────────────────────────────
// HttpCompletionService
// ─────────────────────────────────────────────

/// A completion service that talks to any OpenAI-compatible HTTP API.
#[derive(Clone, Debug)]
pub struct HttpCompletionService {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
}

impl HttpCompletionService {
    /// Create a service with [`DEFAULT_TIMEOUT`].
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a service with a custom whole-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (custom proxies, TLS roots, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Build the full chat completions URL.
pub fn completions_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!("{}/chat/completions", base)
}

#[async_trait]
impl CompletionService for HttpCompletionService {
    async fn create_chat_completion(
        &self,
        base_url: &str,
        api_key: &str,
        request: ChatCompletionRequest,
    ) -> Result<Completion, ProviderError> {
        let url = completions_url(base_url);

        debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            stream = request.stream,
            "Calling LLM"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "HTTP request failed");
                ProviderError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(url = %url, status = %status, body = %body, "API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        if request.stream {
            return Ok(Completion::Stream(decode_sse(response.bytes_stream())));
        }

        let completion = response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        debug!(
            model = completion.model.as_deref().unwrap_or(&request.model),
            choices = completion.choices.len(),
            "LLM response received"
        );

        Ok(Completion::Full(completion))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
