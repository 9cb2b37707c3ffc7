//! In-process adapters with no external infrastructure.

mod in_memory_conversation_repository;
mod in_memory_task_repository;

pub use in_memory_conversation_repository::InMemoryConversationRepository;
pub use in_memory_task_repository::InMemoryTaskRepository;
