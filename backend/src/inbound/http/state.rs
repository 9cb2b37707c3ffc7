//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on domain
//! ports, so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccessTokenVerifier, ChatCommand, ChatQuery, TaskCommand, TaskQuery};

/// Port implementations used by the task and chat handlers.
#[derive(Clone)]
pub struct HttpState {
    pub tasks: Arc<dyn TaskCommand>,
    pub tasks_query: Arc<dyn TaskQuery>,
    pub chat: Arc<dyn ChatCommand>,
    pub chat_query: Arc<dyn ChatQuery>,
    pub tokens: Arc<dyn AccessTokenVerifier>,
}

impl HttpState {
    /// Bundle the driving ports and the token verifier.
    #[must_use]
    pub const fn new(
        tasks: Arc<dyn TaskCommand>,
        tasks_query: Arc<dyn TaskQuery>,
        chat: Arc<dyn ChatCommand>,
        chat_query: Arc<dyn ChatQuery>,
        tokens: Arc<dyn AccessTokenVerifier>,
    ) -> Self {
        Self {
            tasks,
            tasks_query,
            chat,
            chat_query,
            tokens,
        }
    }
}
