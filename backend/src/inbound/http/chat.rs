//! Chat HTTP handlers.
//!
//! ```text
//! POST /api/{owner_id}/chat
//! GET  /api/{owner_id}/chat/{conversation_id}
//! ```
//!
//! Same order as the task handlers: token, path owner, then body.

use actix_web::{get, post, web};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::DomainError;
use crate::domain::chat::Message;
use crate::domain::ports::ChatRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerOwner;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, body_conversation_id, decode_json_body, missing_field_error,
    parse_conversation_id,
};

#[derive(Debug, Deserialize)]
struct OwnerPath {
    owner_id: String,
}

#[derive(Debug, Deserialize)]
struct ConversationPath {
    owner_id: String,
    conversation_id: String,
}

/// Body for sending a message to the assistant.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ChatPayload {
    /// Required; 1 to 2000 characters once trimmed.
    #[schema(example = "add task buy milk")]
    pub message: Option<String>,
    /// Continue this conversation; omit to start a new one.
    #[schema(example = 1)]
    pub conversation_id: Option<i64>,
}

/// The assistant's reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct ChatResponse {
    #[schema(example = "Task 'buy milk' added successfully.")]
    pub response: String,
    #[schema(example = 1)]
    pub conversation_id: i64,
}

/// Task operation recorded with an assistant message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ToolCallResponse {
    #[schema(example = "add_task")]
    pub name: String,
    #[schema(value_type = Object)]
    pub arguments: Value,
    #[schema(value_type = Object)]
    pub output: Value,
}

/// One stored chat message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = 1)]
    pub id: i64,
    /// `user` or `model`.
    #[schema(example = "user")]
    pub sender: String,
    #[schema(example = "add task buy milk")]
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallResponse>,
    /// RFC 3339 UTC timestamp.
    #[schema(example = "2026-03-01T09:00:00.000000Z")]
    pub created_at: String,
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender: message.sender.as_str().to_owned(),
            content: message.content,
            tool_call: message.tool.map(|tool| ToolCallResponse {
                name: tool.name,
                arguments: tool.arguments,
                output: tool.output,
            }),
            created_at: timestamp(message.created_at),
        }
    }
}

/// Send one message and get the assistant's answer.
#[utoipa::path(
    post,
    path = "/api/{owner_id}/chat",
    request_body = ChatPayload,
    params(("owner_id" = String, Path, description = "Owner talking to the assistant")),
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Conversation not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "sendChatMessage"
)]
#[post("/{owner_id}/chat")]
pub async fn send_message(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<OwnerPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<ChatResponse>> {
    let owner_id = owner.require_path_owner(&path.owner_id)?;
    let payload: ChatPayload = decode_json_body(&body)?;
    let message = payload
        .message
        .ok_or_else(|| missing_field_error(FieldName::new("message")))?;
    let conversation_id = payload
        .conversation_id
        .map(body_conversation_id)
        .transpose()?;

    let reply = state
        .chat
        .send_message(ChatRequest {
            owner_id,
            conversation_id,
            message,
        })
        .await
        .map_err(DomainError::from)?;
    Ok(web::Json(ChatResponse {
        response: reply.response,
        conversation_id: reply.conversation_id.get(),
    }))
}

/// Replay a conversation, oldest message first.
#[utoipa::path(
    get,
    path = "/api/{owner_id}/chat/{conversation_id}",
    params(
        ("owner_id" = String, Path, description = "Owner of the conversation"),
        ("conversation_id" = i64, Path, description = "Conversation identifier")
    ),
    responses(
        (status = 200, description = "Messages in order", body = [MessageResponse]),
        (status = 400, description = "Invalid conversation id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Conversation not found", body = ErrorSchema)
    ),
    tags = ["chat"],
    operation_id = "listChatMessages"
)]
#[get("/{owner_id}/chat/{conversation_id}")]
pub async fn list_messages(
    owner: BearerOwner,
    state: web::Data<HttpState>,
    path: web::Path<ConversationPath>,
) -> ApiResult<web::Json<Vec<MessageResponse>>> {
    let owner_id = owner.require_path_owner(&path.owner_id)?;
    let conversation_id = parse_conversation_id(&path.conversation_id)?;
    let messages = state
        .chat_query
        .conversation_messages(&owner_id, conversation_id)
        .await
        .map_err(DomainError::from)?;
    Ok(web::Json(
        messages.into_iter().map(MessageResponse::from).collect(),
    ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(send_message).service(list_messages);
}

#[cfg(test)]
#[path = "chat_tests.rs"]
mod tests;
