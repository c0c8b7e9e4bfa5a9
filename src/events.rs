//! Observer notifications emitted while a response streams in.

/// Transcript snapshot delivered to the observer channel.
///
/// One update is sent after each processed data line, including no-op
/// fragments, strictly in arrival order. The transcript only ever grows,
/// so consumers can render the delta by remembering the previous length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptUpdate {
    /// The full transcript accumulated so far, not just the newest fragment.
    pub transcript: String,
}
