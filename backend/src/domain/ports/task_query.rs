//! Driving port for reading tasks.

use async_trait::async_trait;

use crate::domain::OwnerId;
use crate::domain::tasks::{Task, TaskId, TaskListFilter, TaskServiceError};

/// Driving port for task read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskQuery: Send + Sync {
    /// The owner's tasks passing `filter`, ordered by creation time then id.
    async fn list_tasks(
        &self,
        owner_id: &OwnerId,
        filter: TaskListFilter,
    ) -> Result<Vec<Task>, TaskServiceError>;

    /// One owned task, or [`TaskServiceError::NotFound`].
    async fn get_task(&self, owner_id: &OwnerId, task_id: TaskId) -> Result<Task, TaskServiceError>;
}
