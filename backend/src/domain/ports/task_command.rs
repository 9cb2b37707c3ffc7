//! Driving port for task mutations.

use async_trait::async_trait;

use crate::domain::OwnerId;
use crate::domain::tasks::{Task, TaskId, TaskServiceError};

/// Raw input for creating a task; validated by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    pub owner_id: OwnerId,
    pub title: String,
    pub description: Option<String>,
}

/// Raw input for replacing a task's title and description.
///
/// Completion is deliberately absent: it only changes through
/// [`TaskCommand::toggle_completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    pub owner_id: OwnerId,
    pub task_id: TaskId,
    pub title: String,
    pub description: Option<String>,
}

/// Input for setting a task's completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleCompletionRequest {
    pub owner_id: OwnerId,
    pub task_id: TaskId,
    pub completed: bool,
}

/// Driving port for task mutation operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCommand: Send + Sync {
    /// Validate (title first) and persist a new task.
    async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, TaskServiceError>;

    /// Validate and replace title and description of an owned task.
    async fn update_task(&self, request: UpdateTaskRequest) -> Result<Task, TaskServiceError>;

    /// Set completion on an owned task; idempotent.
    async fn toggle_completion(
        &self,
        request: ToggleCompletionRequest,
    ) -> Result<Task, TaskServiceError>;

    /// Delete an owned task. Returns `false` when nothing was removed.
    async fn delete_task(&self, owner_id: &OwnerId, task_id: TaskId)
    -> Result<bool, TaskServiceError>;
}
