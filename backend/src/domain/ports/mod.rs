//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports ([`TaskRepository`], [`ConversationRepository`],
//! [`AccessTokenVerifier`]) are implemented by outbound adapters. Driving
//! ports ([`TaskCommand`], [`TaskQuery`], [`ChatCommand`], [`ChatQuery`]) are
//! implemented by the domain services and called by inbound adapters. Each
//! port exposes a typed error so adapters map their failures into predictable
//! variants.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_verifier;
mod chat_command;
mod chat_query;
mod conversation_repository;
mod task_command;
mod task_query;
mod task_repository;

#[cfg(test)]
pub use access_token_verifier::MockAccessTokenVerifier;
pub use access_token_verifier::{AccessTokenVerifier, TokenError};
#[cfg(test)]
pub use chat_command::MockChatCommand;
pub use chat_command::{ChatCommand, ChatReply, ChatRequest};
#[cfg(test)]
pub use chat_query::MockChatQuery;
pub use chat_query::ChatQuery;
#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
pub use conversation_repository::{ConversationRepository, ConversationRepositoryError};
#[cfg(test)]
pub use task_command::MockTaskCommand;
pub use task_command::{
    CreateTaskRequest, TaskCommand, ToggleCompletionRequest, UpdateTaskRequest,
};
#[cfg(test)]
pub use task_query::MockTaskQuery;
pub use task_query::TaskQuery;
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{TaskRepository, TaskRepositoryError};
