// SPDX-License-Identifier: Apache-2.0

//! Server-sent-event parsing for streamed chat completions.
//!
//! The OpenAI-compatible streaming format emits `data: {json}` lines and a
//! final `data: [DONE]` sentinel. Chunks can split lines arbitrarily, so
//! incomplete lines are buffered across chunks.

use std::collections::VecDeque;

use anyhow::Result;
use futures::stream::{self, BoxStream, Stream, StreamExt};

use super::types::StreamChunk;

struct SseState<S> {
    body: S,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

/// Extracts the token from one SSE line, if it carries any.
///
/// Returns `Err(())` for the `[DONE]` sentinel.
fn parse_line(line: &str) -> std::result::Result<Option<String>, ()> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        // Comments, event names, and blank keep-alive lines.
        return Ok(None);
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        return Err(());
    }

    // Malformed chunks are skipped rather than killing the stream.
    let Ok(chunk) = serde_json::from_str::<StreamChunk>(data) else {
        return Ok(None);
    };

    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|s| !s.is_empty()))
}

/// Consumes complete lines from the buffer, queueing any tokens they carry.
///
/// Returns `true` when the `[DONE]` sentinel was seen.
fn drain_lines(buffer: &mut Vec<u8>, pending: &mut VecDeque<String>) -> bool {
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&line);
        match parse_line(&line) {
            Ok(Some(token)) => pending.push_back(token),
            Ok(None) => {}
            Err(()) => return true,
        }
    }
    false
}

/// Adapts a raw SSE body into a stream of content tokens.
///
/// Transport errors surface as `Err` items and end the stream; the
/// `[DONE]` sentinel ends it cleanly.
pub fn token_stream<S, B, E>(body: S) -> BoxStream<'static, Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>> + Send + Unpin + 'static,
    B: AsRef<[u8]>,
    E: std::error::Error + Send + Sync + 'static,
{
    let state = SseState {
        body,
        buffer: Vec::new(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(token) = state.pending.pop_front() {
                return Some((Ok(token), state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(chunk.as_ref());
                    state.done = drain_lines(&mut state.buffer, &mut state.pending);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(anyhow::Error::new(e)), state));
                }
                None => {
                    state.done = true;
                }
            }
        }
    })
    .boxed()
}
