//! Server-sent events decoding for streamed chat completions.
//!
//! OpenAI-compatible endpoints emit one `data: <json>` event per chunk and a final
//! `data: [DONE]`. Event framing (multi-line `data:`, comments, `event:`/`id:`
//! fields, CRLF) is handled by `eventsource-stream`; this module only turns event
//! payloads into chunks.

use eventsource_stream::{EventStream, EventStreamError, Eventsource};
use futures_util::stream::{self, Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;
use tracing::warn;

use asak_core::types::ChatCompletionChunk;

use crate::error::ProviderError;
use crate::traits::ChunkStream;

struct SseState<S> {
    events: Pin<Box<EventStream<S>>>,
    done: bool,
}

/// Turn a raw response body into a stream of decoded chunks.
///
/// The stream ends at `[DONE]`, at the end of the body, or right after the
/// first transport or framing error (which is yielded).
pub fn decode_sse<S, B, E>(body: S) -> ChunkStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<ProviderError> + Display + Send + 'static,
{
    let state = SseState {
        events: Box::pin(body.eventsource()),
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if st.done {
                return None;
            }

            match st.events.next().await {
                Some(Ok(event)) => {
                    let data = event.data.trim();
                    if data.is_empty() {
                        continue;
                    }
                    if data == "[DONE]" {
                        st.done = true;
                        return None;
                    }
                    return Some((parse_data(data), st));
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(map_event_error(e)), st));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

fn map_event_error<E>(err: EventStreamError<E>) -> ProviderError
where
    E: Into<ProviderError> + Display,
{
    match err {
        EventStreamError::Transport(e) => e.into(),
        other => ProviderError::Stream(other.to_string()),
    }
}

fn parse_data(data: &str) -> Result<ChatCompletionChunk, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(data).map_err(|e| {
        warn!("Failed to parse stream chunk: {} | data: {}", e, data);
        ProviderError::Decode(e.to_string())
    })?;

    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| err.to_string());
        return Err(ProviderError::Stream(message));
    }

    serde_json::from_value(value).map_err(|e| ProviderError::Decode(e.to_string()))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
