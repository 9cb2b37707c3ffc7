//! Conversation and message records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::domain::OwnerId;

/// Maximum length of a chat message in characters, after trimming.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Error returned when a conversation identifier is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("conversation id must be positive (got {0})")]
pub struct InvalidConversationId(pub i64);

/// Positive identifier assigned by the conversation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Construct a conversation identifier, rejecting zero and negative values.
    pub const fn new(value: i64) -> Result<Self, InvalidConversationId> {
        if value <= 0 {
            return Err(InvalidConversationId(value));
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat thread belonging to one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Stored form. The assistant is persisted as `"model"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "model",
        }
    }

    /// Inverse of [`Sender::as_str`].
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "model" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task operation the assistant ran while answering.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
    pub output: Value,
}

/// Message about to be appended to a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender: Sender,
    pub content: String,
    pub tool: Option<ToolCall>,
}

/// Stored message. Ids increase with insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    pub conversation_id: ConversationId,
    pub owner_id: OwnerId,
    pub sender: Sender,
    pub content: String,
    pub tool: Option<ToolCall>,
    pub created_at: DateTime<Utc>,
}

/// Reasons a chat message is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChatMessageError {
    #[error("message must not be empty")]
    Empty,
    #[error("message must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

impl ChatMessageError {
    /// Stable machine-readable reason.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong { .. } => "too_long",
        }
    }
}

/// Trim `raw` and check it against [`MESSAGE_MAX_CHARS`].
pub fn validate_message(raw: &str) -> Result<&str, ChatMessageError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ChatMessageError::Empty);
    }
    let actual = trimmed.chars().count();
    if actual > MESSAGE_MAX_CHARS {
        return Err(ChatMessageError::TooLong {
            max: MESSAGE_MAX_CHARS,
            actual,
        });
    }
    Ok(trimmed)
}
