//! In-memory conversation history.

use uuid::Uuid;

use super::message::Message;

/// Default title for a freshly started conversation.
const DEFAULT_TITLE: &str = "New Conversation";

/// An ordered history of user and assistant turns.
///
/// The history is what gets replayed to the model on every request, so
/// order matters and entries are append-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    /// Client-generated conversation id.
    pub id: Uuid,
    /// Human-readable title.
    pub title: String,
    messages: Vec<Message>,
}

impl Conversation {
    /// Start an empty conversation with the default title.
    pub fn new() -> Self {
        Self::with_title(DEFAULT_TITLE)
    }

    /// Start an empty conversation with a custom title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message to the history.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The full history in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_empty() {
        let conversation = Conversation::new();
        assert!(conversation.is_empty());
        assert_eq!(conversation.title, "New Conversation");
    }

    #[test]
    fn test_push_preserves_order() {
        let mut conversation = Conversation::with_title("ordering");
        conversation.push(Message::user("first"));
        conversation.push(Message::assistant("second"));
        conversation.push(Message::user("third"));

        let contents: Vec<&str> = conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(conversation.len(), 3);
    }

    #[test]
    fn test_conversations_get_distinct_ids() {
        assert_ne!(Conversation::new().id, Conversation::new().id);
    }
}
