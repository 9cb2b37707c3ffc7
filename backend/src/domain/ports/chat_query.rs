//! Driving port for reading chat history.

use async_trait::async_trait;

use crate::domain::OwnerId;
use crate::domain::chat::{ChatServiceError, ConversationId, Message};

/// Driving port for conversation reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatQuery: Send + Sync {
    /// Every message of an owned conversation, oldest first.
    ///
    /// Fails with [`ChatServiceError::ConversationNotFound`] when the
    /// conversation is absent or foreign.
    async fn conversation_messages(
        &self,
        owner_id: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ChatServiceError>;
}
