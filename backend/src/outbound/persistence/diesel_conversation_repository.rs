//! PostgreSQL-backed [`ConversationRepository`] using Diesel.
//!
//! Message inserts select the parent conversation filtered on `owner_id`, so
//! appending to a foreign conversation inserts nothing and is reported as
//! not found.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Jsonb, Nullable, Text, Timestamptz};
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::OwnerId;
use crate::domain::chat::{
    Conversation, ConversationId, Message, NewMessage, Sender, ToolCall,
};
use crate::domain::ports::{ConversationRepository, ConversationRepositoryError};

use super::faults::Fault;
use super::models::{ConversationRow, MessageRow, NewConversationRow};
use super::pool::DbPool;
use super::schema::{chat_messages, conversations};

const APPEND_MESSAGE_SQL: &str = concat!(
    "INSERT INTO chat_messages ",
    "(conversation_id, owner_id, sender, content, tool_name, tool_arguments, tool_output, created_at) ",
    "SELECT c.id, c.owner_id, $1, $2, $3, $4, $5, $6 FROM conversations c ",
    "WHERE c.id = $7 AND c.owner_id = $8 ",
    "RETURNING id, conversation_id, owner_id, sender, content, ",
    "tool_name, tool_arguments, tool_output, created_at",
);

/// Diesel implementation of the conversation repository port.
#[derive(Clone)]
pub struct DieselConversationRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselConversationRepository {
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn fault(error: impl Into<Fault>) -> ConversationRepositoryError {
    error.into().into()
}

fn conversation_id(raw: i64) -> Result<ConversationId, ConversationRepositoryError> {
    ConversationId::new(raw).map_err(|err| ConversationRepositoryError::query(err.to_string()))
}

fn stored_owner(raw: String, what: &str) -> Result<OwnerId, ConversationRepositoryError> {
    OwnerId::new(raw).map_err(|err| {
        ConversationRepositoryError::query(format!("stored owner id for {what} is invalid: {err}"))
    })
}

fn row_to_conversation(row: ConversationRow) -> Result<Conversation, ConversationRepositoryError> {
    let id = conversation_id(row.id)?;
    Ok(Conversation {
        id,
        owner_id: stored_owner(row.owner_id, &format!("conversation {id}"))?,
        created_at: row.created_at,
    })
}

fn row_to_message(row: MessageRow) -> Result<Message, ConversationRepositoryError> {
    let sender = Sender::parse(&row.sender).ok_or_else(|| {
        ConversationRepositoryError::query(format!(
            "message {} has unknown sender {:?}",
            row.id, row.sender
        ))
    })?;
    let tool = match (row.tool_name, row.tool_arguments, row.tool_output) {
        (Some(name), Some(arguments), Some(output)) => Some(ToolCall {
            name,
            arguments,
            output,
        }),
        (None, None, None) => None,
        _ => {
            return Err(ConversationRepositoryError::query(format!(
                "message {} has a partial tool record",
                row.id
            )));
        }
    };
    Ok(Message {
        id: row.id,
        conversation_id: conversation_id(row.conversation_id)?,
        owner_id: stored_owner(row.owner_id, &format!("message {}", row.id))?,
        sender,
        content: row.content,
        tool,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ConversationRepository for DieselConversationRepository {
    async fn create_conversation(
        &self,
        owner: &OwnerId,
    ) -> Result<Conversation, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(fault)?;
        let row = NewConversationRow {
            owner_id: owner.as_str(),
            created_at: self.clock.utc(),
        };
        let inserted = diesel::insert_into(conversations::table)
            .values(&row)
            .returning(ConversationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(fault)?;
        row_to_conversation(inserted)
    }

    async fn find_conversation(
        &self,
        owner: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(fault)?;
        let row: Option<ConversationRow> = conversations::table
            .filter(conversations::id.eq(conversation_id.get()))
            .filter(conversations::owner_id.eq(owner.as_str()))
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(fault)?;
        row.map(row_to_conversation).transpose()
    }

    async fn append_message(
        &self,
        owner: &OwnerId,
        message: &NewMessage,
    ) -> Result<Message, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(fault)?;
        let tool = message.tool.as_ref();
        let row: Option<MessageRow> = diesel::sql_query(APPEND_MESSAGE_SQL)
            .bind::<Text, _>(message.sender.as_str())
            .bind::<Text, _>(message.content.as_str())
            .bind::<Nullable<Text>, _>(tool.map(|call| call.name.as_str()))
            .bind::<Nullable<Jsonb>, _>(tool.map(|call| call.arguments.clone()))
            .bind::<Nullable<Jsonb>, _>(tool.map(|call| call.output.clone()))
            .bind::<Timestamptz, _>(self.clock.utc())
            .bind::<BigInt, _>(message.conversation_id.get())
            .bind::<Text, _>(owner.as_str())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(fault)?;
        row.map_or(
            Err(ConversationRepositoryError::not_found(message.conversation_id)),
            row_to_message,
        )
    }

    async fn list_messages(
        &self,
        owner: &OwnerId,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(fault)?;
        let rows: Vec<MessageRow> = chat_messages::table
            .filter(chat_messages::conversation_id.eq(conversation_id.get()))
            .filter(chat_messages::owner_id.eq(owner.as_str()))
            .select(MessageRow::as_select())
            .order((chat_messages::created_at.asc(), chat_messages::id.asc()))
            .load(&mut conn)
            .await
            .map_err(fault)?;
        rows.into_iter().map(row_to_message).collect()
    }
}
