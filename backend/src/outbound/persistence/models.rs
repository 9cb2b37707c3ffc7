//! Diesel row models.
//!
//! These are internal to the persistence adapters; the domain only ever sees
//! its own types such as [`Task`](crate::domain::tasks::Task).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

use super::schema::{chat_messages, conversations, tasks};

/// Row returned by `SELECT` and `… RETURNING` statements.
///
/// Derives `QueryableByName` as well so raw `sql_query` updates can load it.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TaskRow {
    pub id: i64,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert model; the id comes from the `BIGSERIAL` sequence.
#[derive(Debug, Insertable)]
#[diesel(table_name = tasks)]
pub(crate) struct NewTaskRow<'a> {
    pub owner_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: i64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = conversations)]
pub(crate) struct NewConversationRow<'a> {
    pub owner_id: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Message row. Loaded by name from the owner-checked `INSERT … SELECT`.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub owner_id: String,
    pub sender: String,
    pub content: String,
    pub tool_name: Option<String>,
    pub tool_arguments: Option<Value>,
    pub tool_output: Option<Value>,
    pub created_at: DateTime<Utc>,
}
