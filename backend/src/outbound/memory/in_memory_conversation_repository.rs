//! In-memory [`ConversationRepository`] for tests and database-less runs.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::OwnerId;
use crate::domain::chat::{Conversation, ConversationId, Message, NewMessage};
use crate::domain::ports::{ConversationRepository, ConversationRepositoryError};

#[derive(Debug, Default)]
struct State {
    conversations: BTreeMap<ConversationId, Conversation>,
    messages: Vec<Message>,
    last_conversation_id: i64,
    last_message_id: i64,
}

impl State {
    fn owned(&self, owner: &OwnerId, conversation_id: ConversationId) -> Option<&Conversation> {
        self.conversations
            .get(&conversation_id)
            .filter(|conversation| &conversation.owner_id == owner)
    }
}

/// Conversation store kept in process memory.
///
/// Messages live in one append-only vector, so insertion order doubles as
/// the tie-breaker for equal timestamps.
#[derive(Clone)]
pub struct InMemoryConversationRepository {
    state: Arc<RwLock<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryConversationRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryConversationRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, ConversationRepositoryError> {
        self.state
            .read()
            .map_err(|err| ConversationRepositoryError::connection(err.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, ConversationRepositoryError> {
        self.state
            .write()
            .map_err(|err| ConversationRepositoryError::connection(err.to_string()))
    }
}

fn next_id(last: i64, what: &str) -> Result<i64, ConversationRepositoryError> {
    last.checked_add(1)
        .ok_or_else(|| ConversationRepositoryError::query(format!("{what} id space exhausted")))
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create_conversation(
        &self,
        owner: &OwnerId,
    ) -> Result<Conversation, ConversationRepositoryError> {
        let mut state = self.write()?;
        let next = next_id(state.last_conversation_id, "conversation")?;
        let id = ConversationId::new(next)
            .map_err(|err| ConversationRepositoryError::query(err.to_string()))?;
        let conversation = Conversation {
            id,
            owner_id: owner.clone(),
            created_at: self.clock.utc(),
        };
        state.last_conversation_id = next;
        state.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    async fn find_conversation(
        &self,
        owner: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        let state = self.read()?;
        Ok(state.owned(owner, conversation_id).cloned())
    }

    async fn append_message(
        &self,
        owner: &OwnerId,
        message: &NewMessage,
    ) -> Result<Message, ConversationRepositoryError> {
        let mut state = self.write()?;
        if state.owned(owner, message.conversation_id).is_none() {
            return Err(ConversationRepositoryError::not_found(
                message.conversation_id,
            ));
        }
        let id = next_id(state.last_message_id, "message")?;
        let stored = Message {
            id,
            conversation_id: message.conversation_id,
            owner_id: owner.clone(),
            sender: message.sender,
            content: message.content.clone(),
            tool: message.tool.clone(),
            created_at: self.clock.utc(),
        };
        state.last_message_id = id;
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(
        &self,
        owner: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ConversationRepositoryError> {
        let state = self.read()?;
        if state.owned(owner, conversation_id).is_none() {
            return Ok(Vec::new());
        }
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|message| message.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|message| (message.created_at, message.id));
        Ok(messages)
    }
}
