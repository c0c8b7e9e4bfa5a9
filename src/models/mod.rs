//! Data models for conversations and requests.

mod conversation;
mod message;
mod request;

pub use conversation::Conversation;
pub use message::{Message, Role};
pub use request::{ChatRequest, ChatTurn};
