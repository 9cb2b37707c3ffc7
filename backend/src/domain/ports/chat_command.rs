//! Driving port for the task assistant.

use async_trait::async_trait;

use crate::domain::OwnerId;
use crate::domain::chat::{ChatServiceError, ConversationId};

/// One user turn. Without a conversation id a new conversation is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub owner_id: OwnerId,
    pub conversation_id: Option<ConversationId>,
    pub message: String,
}

/// The assistant's answer and the conversation it was recorded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub conversation_id: ConversationId,
    pub response: String,
}

/// Driving port for sending messages to the assistant.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatCommand: Send + Sync {
    /// Record the user's message, act on it and record the reply.
    async fn send_message(&self, request: ChatRequest) -> Result<ChatReply, ChatServiceError>;
}
