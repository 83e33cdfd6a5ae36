// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events emulation of a streamed chat completion.
//!
//! The answer is already complete when streaming starts; it is split into
//! tokens and replayed as one `chat.completion.chunk` per token, paced by a
//! short delay, followed by a terminal chunk with usage.
//!
//! SSE event format:
//! ```text
//! data: {"id":"chatcmpl-…","object":"chat.completion.chunk",…,"choices":[{"index":0,"delta":{"role":"assistant","content":"你好"},"finish_reason":null}]}
//!
//! data: {…,"choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"usage":{…}}
//!
//! data: [DONE]
//! ```

use std::time::Duration;

use axum::response::sse::Event;
use futures::stream::{self, Stream};
use qwenmux_config::model::StreamingConfig;

use crate::types::{ChatCompletionChunk, Usage};

/// Final SSE payload when the sentinel is enabled.
pub const DONE_SENTINEL: &str = "[DONE]";

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lazy tokenizer over a borrowed string.
///
/// Each token is a maximal run of word characters or a single other
/// non-whitespace character, prefixed by the whitespace before it. The last
/// token also carries any trailing whitespace, so the concatenation of all
/// tokens equals the input whenever it has a non-whitespace character.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    /// Continue tokenizing `text` from byte offset `pos`.
    fn resume(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    /// Byte offset of the next unread character.
    fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = &self.text[self.pos..];
        let body_start = rest.find(|c: char| !c.is_whitespace())?;
        let body = &rest[body_start..];

        let first = body.chars().next()?;
        let body_len = if is_word_char(first) {
            body.find(|c: char| !is_word_char(c)).unwrap_or(body.len())
        } else {
            first.len_utf8()
        };

        let mut end = body_start + body_len;
        if rest[end..].chars().all(char::is_whitespace) {
            end = rest.len();
        }

        self.pos += end;
        Some(&rest[..end])
    }
}

/// Split `text` into stream tokens.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens::resume(text, 0)
}

/// Pacing and termination settings for the emulator.
#[derive(Debug, Clone, Copy)]
pub struct StreamSettings {
    /// Pause between consecutive content chunks.
    pub chunk_delay: Duration,
    /// Emit `data: [DONE]` after the terminal chunk.
    pub done_sentinel: bool,
}

impl From<&StreamingConfig> for StreamSettings {
    fn from(config: &StreamingConfig) -> Self {
        Self {
            chunk_delay: Duration::from_millis(config.chunk_delay_ms),
            done_sentinel: config.done_sentinel,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self::from(&StreamingConfig::default())
    }
}

/// A completed answer to replay as a stream.
#[derive(Debug, Clone)]
pub struct StreamedCompletion {
    /// Completion id shared by every chunk.
    pub id: String,
    /// Model reported on every chunk.
    pub model: String,
    /// Full answer text.
    pub answer: String,
    /// Prompt tokens reported on the terminal chunk.
    pub prompt_tokens: u64,
}

/// One item of the emulated stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Chunk(ChatCompletionChunk),
    Done,
}

impl StreamEvent {
    /// Encode as an SSE `data:` event.
    pub fn into_sse(self) -> Result<Event, axum::Error> {
        match self {
            StreamEvent::Chunk(chunk) => Event::default().json_data(chunk),
            StreamEvent::Done => Ok(Event::default().data(DONE_SENTINEL)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tokens,
    Sentinel,
    Finished,
}

struct Emulator {
    completion: StreamedCompletion,
    settings: StreamSettings,
    pos: usize,
    emitted: u64,
    phase: Phase,
}

impl Emulator {
    async fn advance(&mut self) -> Option<StreamEvent> {
        match self.phase {
            Phase::Tokens => {
                let next = {
                    let mut tokens = Tokens::resume(&self.completion.answer, self.pos);
                    tokens.next().map(|t| (t.to_string(), tokens.position()))
                };

                let Some((token, pos)) = next else {
                    self.phase = if self.settings.done_sentinel {
                        Phase::Sentinel
                    } else {
                        Phase::Finished
                    };
                    let usage = Usage::new(self.completion.prompt_tokens, self.emitted);
                    tracing::debug!(
                        completion_id = %self.completion.id,
                        completion_tokens = self.emitted,
                        prompt_tokens = self.completion.prompt_tokens,
                        "sending terminal chunk"
                    );
                    return Some(StreamEvent::Chunk(ChatCompletionChunk::terminal(
                        &self.completion.id,
                        &self.completion.model,
                        usage,
                    )));
                };

                if self.emitted > 0 && !self.settings.chunk_delay.is_zero() {
                    tokio::time::sleep(self.settings.chunk_delay).await;
                }
                self.pos = pos;
                self.emitted += 1;
                tracing::trace!(token = %token, "sending token");
                Some(StreamEvent::Chunk(ChatCompletionChunk::token(
                    &self.completion.id,
                    &self.completion.model,
                    token,
                )))
            }
            Phase::Sentinel => {
                self.phase = Phase::Finished;
                Some(StreamEvent::Done)
            }
            Phase::Finished => None,
        }
    }
}

/// Replay a completed answer as a paced chunk stream.
///
/// Dropping the stream (client disconnect) stops it; there is nothing else
/// to clean up.
pub fn emulate(
    completion: StreamedCompletion,
    settings: StreamSettings,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    let emulator = Emulator {
        completion,
        settings,
        pos: 0,
        emitted: 0,
        phase: Phase::Tokens,
    };
    stream::unfold(emulator, |mut emulator| async move {
        let event = emulator.advance().await?;
        Some((event, emulator))
    })
}
