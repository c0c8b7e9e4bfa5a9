//! SSE stream decoding.
//!
//! Decodes the text-event framing used by the streaming chat endpoint:
//! - lines separated by `\n` (optionally `\r\n`)
//! - blank lines and lines starting with `:` are keep-alives
//! - data lines begin with `data: `
//! - a payload of `[DONE]` terminates the stream
//!
//! # Module structure
//! - `framer` - line framing across arbitrary chunk boundaries
//! - `parser` - line classification and payload decoding
//! - `payloads` - wire document structs

mod framer;
mod parser;
mod payloads;

pub use framer::LineFramer;
pub use parser::{classify_line, decode_payload, Decoded, DATA_PREFIX, DONE_SENTINEL};
pub use payloads::{Choice, ChunkPayload, Delta};
