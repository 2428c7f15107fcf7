//! Text-only view over a streamed completion.

use std::fmt;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::{Stream, StreamExt};

use asak_providers::{ChunkStream, ProviderError};

/// Forward-only stream of text fragments from `choices[0].delta.content`.
///
/// Chunks that carry no text (role announcements, finish markers, empty
/// strings) are skipped rather than yielded as `""`. Dropping the stream
/// closes the underlying HTTP body.
pub struct DeltaStream {
    inner: ChunkStream,
}

impl DeltaStream {
    pub fn new(inner: ChunkStream) -> Self {
        Self { inner }
    }

    /// Drain the stream, concatenating every delta. Stops at the first error.
    pub async fn collect_text(mut self) -> Result<String, ProviderError> {
        let mut text = String::new();
        while let Some(delta) = self.next().await {
            text.push_str(&delta?);
        }
        Ok(text)
    }
}

impl Stream for DeltaStream {
    type Item = Result<String, ProviderError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(self.inner.poll_next_unpin(cx)) {
                None => return Poll::Ready(None),
                Some(Err(e)) => return Poll::Ready(Some(Err(e))),
                Some(Ok(chunk)) => match chunk.text_delta() {
                    Some(text) if !text.is_empty() => {
                        return Poll::Ready(Some(Ok(text.to_string())))
                    }
                    _ => continue,
                },
            }
        }
    }
}

impl fmt::Debug for DeltaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaStream").finish_non_exhaustive()
    }
}
