//! Request body for the streaming chat completions endpoint.

use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// One conversation turn as sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

/// Request structure for streaming chat completions.
///
/// Carries the full prior conversation so the model sees every earlier
/// turn; `stream` is always set so the response arrives as an SSE stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub stream: bool,
}

impl ChatRequest {
    /// Build a request replaying the given history.
    pub fn from_history(model: impl Into<String>, history: &[Message]) -> Self {
        Self {
            model: model.into(),
            messages: history.iter().map(ChatTurn::from).collect(),
            stream: true,
        }
    }
}
