//! HTTP inbound adapter exposing the task REST endpoints and the chat
//! assistant.

pub mod auth;
pub mod chat;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod tasks;
pub mod validation;

pub use error::ApiResult;
