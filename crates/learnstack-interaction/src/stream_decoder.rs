//! Incremental decoding of a streamed chat reply.
//!
//! The backend answers `POST /chat` with a chunked body that, once complete,
//! is a single JSON document `{ "reply": "...", "history": [...] }`. This
//! module turns those chunks into single-character events on `reply`:
//!
//! 1. Bytes are decoded with [`Utf8ChunkDecoder`], which carries incomplete
//!    multi-byte sequences over to the next chunk.
//! 2. The accumulated text is parsed as a whole after every chunk. Parse
//!    failures are expected while the document is incomplete and are ignored.
//! 3. Whenever a parse succeeds, the characters of `reply` beyond what was
//!    already emitted are released, in order.
//!
//! A body that never forms a complete document releases nothing.

use futures::{Stream, StreamExt};
use serde_json::Value;
use std::time::Duration;

/// Decodes UTF-8 across arbitrary chunk boundaries.
///
/// Invalid sequences become U+FFFD; a sequence cut at the end of a chunk is
/// held back until the next chunk completes it.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut text = String::with_capacity(bytes.len());
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, invalid) = rest.split_at(err.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));

                    match err.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &invalid[len..];
                        }
                        None => {
                            self.pending = invalid.to_vec();
                            break;
                        }
                    }
                }
            }
        }

        text
    }

    /// Bytes of an unfinished sequence waiting for the next chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Tracks a streamed reply document and releases its new characters.
#[derive(Debug, Default)]
pub struct ReplyStreamDecoder {
    utf8: Utf8ChunkDecoder,
    json_buffer: String,
    reply_buffer: String,
    completed: bool,
}

impl ReplyStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk of the body.
    ///
    /// # Returns
    ///
    /// The characters of `reply` that no earlier call returned, in order.
    /// Empty while the document is still incomplete.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<char> {
        let text = self.utf8.decode(chunk);
        self.json_buffer.push_str(&text);
        self.poll()
    }

    /// The reply text released so far.
    pub fn reply(&self) -> &str {
        &self.reply_buffer
    }

    /// Whether the buffer has parsed as a complete JSON document at least once.
    pub fn is_complete(&self) -> bool {
        self.completed
    }

    fn poll(&mut self) -> Vec<char> {
        // Only an object can carry `reply`, and a complete object ends in '}'.
        if !self.json_buffer.trim_end().ends_with('}') {
            return Vec::new();
        }

        let Ok(document) = serde_json::from_str::<Value>(&self.json_buffer) else {
            return Vec::new();
        };
        self.completed = true;

        let Some(reply) = document
            .get("reply")
            .and_then(Value::as_str)
            .filter(|reply| !reply.is_empty())
        else {
            return Vec::new();
        };

        let released = self.reply_buffer.chars().count();
        let fresh: Vec<char> = reply.chars().skip(released).collect();
        self.reply_buffer = reply.to_string();
        fresh
    }
}

/// What a fully consumed body produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    /// Number of characters passed to the callback.
    pub emitted: usize,
    /// Whether a complete JSON document was ever seen.
    pub completed: bool,
}

/// Drives a [`ReplyStreamDecoder`] over a byte stream.
///
/// `on_char` is called once per released character, and each call is
/// followed by `typing_delay`. The next chunk is not read until the current
/// one has been fully released, so the output is paced at no more than one
/// character per `typing_delay`.
///
/// # Errors
///
/// Returns the stream's own error as soon as a chunk fails; characters
/// already released stay released.
pub async fn stream_reply<S, B, E>(
    body: S,
    typing_delay: Duration,
    on_char: &mut (dyn FnMut(char) + Send),
) -> Result<StreamOutcome, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = ReplyStreamDecoder::new();
    let mut emitted = 0;

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;

        for ch in decoder.push(chunk.as_ref()) {
            on_char(ch);
            emitted += 1;
            if !typing_delay.is_zero() {
                tokio::time::sleep(typing_delay).await;
            }
        }
    }

    if !decoder.is_complete() {
        tracing::warn!(
            "[StreamDecoder] Body ended before a complete reply document ({} bytes buffered)",
            decoder.json_buffer.len()
        );
    }

    Ok(StreamOutcome {
        emitted,
        completed: decoder.is_complete(),
    })
}
