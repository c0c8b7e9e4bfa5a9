//! Line classification and payload decoding.
//!
//! Each complete line from the framer is either a keep-alive to skip or a
//! `data: ` line whose payload decodes to a terminal marker, a content
//! fragment, or a malformed (usually truncated) document.

use crate::sse::payloads::ChunkPayload;

/// Prefix marking a data-bearing line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload value that terminates the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of decoding one data-line payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The termination sentinel was received.
    Terminal,
    /// A content fragment; empty when the chunk was structural only.
    Fragment(String),
    /// The payload was not a valid document. Usually a chunk boundary
    /// cut the line mid-JSON; the caller owns the retry policy.
    Malformed,
}

/// Classify one framed line, returning the payload of a data line.
///
/// Blank lines, comment lines (leading `:`), and lines without the
/// `data: ` prefix (unrecognized event types) are all skipped by
/// returning `None`.
pub fn classify_line(line: &str) -> Option<&str> {
    if line.starts_with(':') || line.trim().is_empty() {
        return None;
    }
    let payload = line.strip_prefix(DATA_PREFIX)?;
    Some(payload.trim())
}

/// Decode a data-line payload.
///
/// Never fails: unparseable payloads come back as [`Decoded::Malformed`]
/// so the stream can recover from mid-document chunk boundaries without
/// exception-style control flow.
pub fn decode_payload(payload: &str) -> Decoded {
    if payload == DONE_SENTINEL {
        return Decoded::Terminal;
    }
    match serde_json::from_str::<ChunkPayload>(payload) {
        Ok(chunk) => Decoded::Fragment(chunk.into_content().unwrap_or_default()),
        Err(_) => Decoded::Malformed,
    }
}
