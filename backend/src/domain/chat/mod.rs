//! Task assistant reachable through a chat endpoint.
//!
//! Messages are matched against a handful of keyword commands (add, list,
//! complete, delete) and answered by running the corresponding task
//! operation. Conversations and their messages are stored per owner so a
//! client can continue a thread or replay it.

mod conversation;
mod error;
mod intent;
mod service;

pub use self::conversation::{
    ChatMessageError, Conversation, ConversationId, InvalidConversationId, MESSAGE_MAX_CHARS,
    Message, NewMessage, Sender, ToolCall, validate_message,
};
pub use self::error::ChatServiceError;
pub use self::intent::{DEFAULT_TASK_TITLE, Intent, TaskTarget};
pub use self::service::{ChatService, TASK_NOT_FOUND_REPLY, UNKNOWN_COMMAND_REPLY};
