//! Line framing for the SSE byte stream.
//!
//! Transport chunks arrive at arbitrary boundaries that can split the
//! stream mid-line or mid-payload. The framer buffers text across chunks
//! and only ever hands out complete, newline-terminated lines.

/// Splits incoming text into complete lines, carrying any trailing
/// partial line over to the next chunk.
///
/// The carry-over buffer plus the text not yet fed always reconstructs
/// the original stream; nothing is dropped or duplicated at chunk
/// boundaries.
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Text observed but not yet resolved into a complete line.
    buffer: String,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one transport chunk to the carry-over buffer.
    pub fn feed(&mut self, chunk: &str) {
        self.buffer.push_str(chunk);
    }

    /// Pop the next complete line, if one is buffered.
    ///
    /// The returned line has its `\n` terminator removed and a single
    /// trailing `\r` stripped (for `\r\n` streams). Returns `None` once
    /// only a partial line remains; that residual stays buffered for the
    /// next [`feed`](Self::feed).
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.find('\n')?;
        let line = self.buffer[..pos]
            .strip_suffix('\r')
            .unwrap_or(&self.buffer[..pos])
            .to_string();
        self.buffer.drain(..=pos);
        Some(line)
    }

    /// Put a line back at the front of the buffer, terminator restored.
    ///
    /// Used when a data line turned out to be an incomplete payload: the
    /// line waits in front of any later lines until more data arrives.
    pub fn requeue(&mut self, line: &str) {
        let mut restored = String::with_capacity(line.len() + 1 + self.buffer.len());
        restored.push_str(line);
        restored.push('\n');
        restored.push_str(&self.buffer);
        self.buffer = restored;
    }

    /// The unterminated residual currently buffered.
    pub fn pending(&self) -> &str {
        &self.buffer
    }

    /// Take everything still buffered, leaving the framer empty.
    ///
    /// Called when the transport reports end-of-data and no further
    /// chunks can complete the residual.
    pub fn take_pending(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}
