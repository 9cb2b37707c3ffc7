//! PostgreSQL persistence adapters using Diesel.
//!
//! Row models (`models.rs`) and the table definitions (`schema.rs`) are
//! internal; only the repositories, the pool and the migration runner are
//! exported.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mockable::DefaultClock;
//! use taskflow::outbound::persistence::{
//!     DbPool, DieselConversationRepository, DieselTaskRepository, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/tasks")).await?;
//! let repo = DieselTaskRepository::new(pool.clone(), Arc::new(DefaultClock));
//! let chats = DieselConversationRepository::new(pool, Arc::new(DefaultClock));
//! ```

mod diesel_conversation_repository;
mod diesel_task_repository;
mod faults;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_conversation_repository::DieselConversationRepository;
pub use diesel_task_repository::DieselTaskRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_MAX_SIZE, DbPool, PoolConfig, PoolError};
