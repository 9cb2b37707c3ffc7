//! Driven port for chat history persistence.
//!
//! Conversations are owner-scoped the same way tasks are: a conversation that
//! belongs to someone else is reported as absent.

use async_trait::async_trait;

use crate::domain::OwnerId;
use crate::domain::chat::{Conversation, ConversationId, Message, NewMessage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversation repository adapters.
    pub enum ConversationRepositoryError {
        /// The store could not be reached or a connection could not be checked out.
        Connection { message: String } =>
            "conversation repository connection failed: {message}",
        /// A statement failed while executing.
        Query { message: String } =>
            "conversation repository query failed: {message}",
        /// No conversation with this id exists for the owner.
        NotFound { conversation_id: ConversationId } =>
            "conversation {conversation_id} not found",
    }
}

/// Owner-scoped storage for conversations and their messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Start an empty conversation stamped with the current time.
    async fn create_conversation(
        &self,
        owner: &OwnerId,
    ) -> Result<Conversation, ConversationRepositoryError>;

    /// Fetch a conversation, or `None` when it is absent or foreign.
    async fn find_conversation(
        &self,
        owner: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// Append a message to an owned conversation.
    ///
    /// Fails with [`ConversationRepositoryError::NotFound`] when the
    /// conversation is absent or foreign.
    async fn append_message(
        &self,
        owner: &OwnerId,
        message: &NewMessage,
    ) -> Result<Message, ConversationRepositoryError>;

    /// Messages of an owned conversation, oldest first with ties broken by id.
    ///
    /// A foreign or unknown conversation yields an empty list.
    async fn list_messages(
        &self,
        owner: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ConversationRepositoryError>;
}
