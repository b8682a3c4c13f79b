//! Incremental re-framing of NIM server-sent-event streams.
//!
//! [`StreamReframer`] is fed raw upstream reads in arrival order. It splits
//! them into lines, carrying the trailing partial line over to the next read,
//! and turns each complete `data:` line into an outbound frame:
//!
//! - `data: [DONE]` is forwarded unchanged.
//! - JSON payloads get `choices[0].delta` normalized: `content` is always a
//!   string and reasoning tokens are removed.
//! - Anything that fails to parse is forwarded unchanged.
//!
//! Lines without the `data:` marker (comments, `event:`, blank separators)
//! are dropped.

use bytes::Bytes;
use serde_json::Value;

pub const DATA_PREFIX: &[u8] = b"data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Delta fields that carry chain-of-thought tokens.
const REASONING_FIELDS: &[&str] = &["reasoning_content", "reasoning"];

/// Line accumulator for one upstream stream.
#[derive(Debug, Default)]
pub struct StreamReframer {
    carry: Vec<u8>,
}

impl StreamReframer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one upstream read, returning the frames for every line it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        self.carry.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(pos) = self.carry[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            if let Some(frame) = reframe_line(&self.carry[start..end]) {
                frames.push(frame);
            }
            start = end + 1;
        }
        self.carry.drain(..start);

        frames
    }

    /// Call when the upstream ends cleanly; treats any unterminated tail as a full line.
    pub fn finish(&mut self) -> Option<Bytes> {
        let tail = std::mem::take(&mut self.carry);
        if tail.is_empty() {
            None
        } else {
            reframe_line(&tail)
        }
    }

    /// Bytes of the partial line waiting for its newline.
    pub fn pending(&self) -> &[u8] {
        &self.carry
    }
}

/// Translate one complete line (without its `\n`) into an outbound frame.
pub fn reframe_line(line: &[u8]) -> Option<Bytes> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(b" ").unwrap_or(payload);

    if std::str::from_utf8(payload).map(str::trim) == Ok(DONE_SENTINEL) {
        return Some(frame(line));
    }

    match serde_json::from_slice::<Value>(payload) {
        Ok(mut chunk) => {
            normalize_chunk(&mut chunk);
            let json = chunk.to_string();
            Some(Bytes::from(format!("data: {json}\n\n")))
        }
        Err(e) => {
            tracing::debug!(error = %e, "forwarding unparseable stream line unchanged");
            Some(frame(line))
        }
    }
}

/// Normalize the first choice's delta in place.
pub fn normalize_chunk(chunk: &mut Value) {
    let Some(delta) = chunk
        .pointer_mut("/choices/0/delta")
        .and_then(Value::as_object_mut)
    else {
        return;
    };

    let has_content = matches!(delta.get("content"), Some(Value::String(s)) if !s.is_empty());
    if !has_content {
        delta.insert("content".to_string(), Value::String(String::new()));
    }

    for field in REASONING_FIELDS {
        delta.remove(*field);
    }
}

fn frame(line: &[u8]) -> Bytes {
    let mut out = Vec::with_capacity(line.len() + 2);
    out.extend_from_slice(line);
    out.extend_from_slice(b"\n\n");
    Bytes::from(out)
}
