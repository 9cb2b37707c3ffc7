//! Shared validation helpers for inbound HTTP adapters.
//!
//! Bodies and path segments arrive loosely typed; these helpers turn
//! structural failures into `invalid_request` errors with field context.
//! Title and description rules stay in the domain validator.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::DomainError;
use crate::domain::chat::ConversationId;
use crate::domain::tasks::TaskId;

/// Validation error codes for structural request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidTaskId,
    InvalidConversationId,
}

impl ErrorCode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidTaskId => "invalid_task_id",
            Self::InvalidConversationId => "invalid_conversation_id",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode) -> DomainError {
    DomainError::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

/// Error for a required body field that was absent or `null`.
pub(crate) fn missing_field_error(field: FieldName) -> DomainError {
    field_error(
        field,
        format!("missing required field: {}", field.as_str()),
        ErrorCode::MissingField,
    )
}

/// Decode a raw JSON body once the caller has been authorised.
///
/// Handlers take `web::Bytes` rather than `web::Json` so that ownership is
/// checked before the body is looked at.
pub(crate) fn decode_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, DomainError> {
    serde_json::from_slice(body).map_err(|err| {
        DomainError::invalid_request(format!("request body is not valid JSON: {err}"))
    })
}

/// Parse the `{id}` path segment into a [`TaskId`].
pub(crate) fn parse_task_id(raw: &str) -> Result<TaskId, DomainError> {
    let field = FieldName::new("id");
    let invalid = || {
        field_error(
            field,
            format!("task id must be a positive integer, got {raw:?}"),
            ErrorCode::InvalidTaskId,
        )
    };
    let value: i64 = raw.trim().parse().map_err(|_| invalid())?;
    TaskId::new(value).map_err(|_| invalid())
}

fn invalid_conversation_id(shown: &str) -> DomainError {
    field_error(
        FieldName::new("conversation_id"),
        format!("conversation id must be a positive integer, got {shown}"),
        ErrorCode::InvalidConversationId,
    )
}

/// Parse the `{conversation_id}` path segment.
pub(crate) fn parse_conversation_id(raw: &str) -> Result<ConversationId, DomainError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid_conversation_id(&format!("{raw:?}")))?;
    ConversationId::new(value).map_err(|err| invalid_conversation_id(&err.0.to_string()))
}

/// Check a `conversation_id` taken from a request body.
pub(crate) fn body_conversation_id(value: i64) -> Result<ConversationId, DomainError> {
    ConversationId::new(value).map_err(|err| invalid_conversation_id(&err.0.to_string()))
}
