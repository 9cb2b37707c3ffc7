//! Failures surfaced by the chat service.

use serde_json::json;
use thiserror::Error;

use crate::domain::DomainError;
use crate::domain::ports::ConversationRepositoryError;
use crate::domain::tasks::TaskServiceError;

use super::{ChatMessageError, ConversationId};

/// Typed outcome of a failed chat turn.
///
/// Task-level problems such as an unknown task id are answered in the reply
/// text instead; only these cases fail the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatServiceError {
    #[error(transparent)]
    InvalidMessage(#[from] ChatMessageError),
    #[error("conversation {conversation_id} not found")]
    ConversationNotFound { conversation_id: ConversationId },
    /// Conversation or task storage failed.
    #[error("chat storage failed: {message}")]
    Storage { message: String, retryable: bool },
}

impl From<ConversationRepositoryError> for ChatServiceError {
    fn from(value: ConversationRepositoryError) -> Self {
        match value {
            ConversationRepositoryError::NotFound { conversation_id } => {
                Self::ConversationNotFound { conversation_id }
            }
            ConversationRepositoryError::Connection { message } => Self::Storage {
                message,
                retryable: true,
            },
            ConversationRepositoryError::Query { message } => Self::Storage {
                message,
                retryable: false,
            },
        }
    }
}

/// Task failures that escape the assistant's reply handling.
///
/// Only storage faults are expected here; anything else means the service
/// asked for something it should have answered in text.
impl From<TaskServiceError> for ChatServiceError {
    fn from(value: TaskServiceError) -> Self {
        match value {
            TaskServiceError::Storage { message, retryable } => Self::Storage { message, retryable },
            other => Self::Storage {
                message: other.to_string(),
                retryable: false,
            },
        }
    }
}

impl From<ChatServiceError> for DomainError {
    fn from(value: ChatServiceError) -> Self {
        match value {
            ChatServiceError::InvalidMessage(err) => Self::invalid_request(err.to_string())
                .with_details(json!({
                    "field": "message",
                    "code": err.code(),
                })),
            ChatServiceError::ConversationNotFound { conversation_id } => {
                Self::not_found("conversation not found").with_details(json!({
                    "conversationId": conversation_id.get(),
                }))
            }
            ChatServiceError::Storage {
                retryable: true, ..
            } => Self::service_unavailable("chat storage is temporarily unavailable"),
            ChatServiceError::Storage { message, .. } => {
                Self::internal(format!("chat storage failed: {message}"))
            }
        }
    }
}
