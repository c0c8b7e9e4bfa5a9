//! Wire documents carried on `data:` lines.
//!
//! The endpoint streams OpenAI-style chat completion chunks: each data
//! line holds one JSON document with the next content fragment nested at
//! `choices[0].delta.content`.

use serde::Deserialize;

/// One chat-completion chunk document.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkPayload {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// A single completion choice within a chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub delta: Delta,
}

/// Incremental message delta. `content` is absent on structural events
/// (role announcements, finish markers, keep-alive chunks).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChunkPayload {
    /// Extract the incremental content fragment, if the chunk carries one.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
    }
}
