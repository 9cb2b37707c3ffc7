//! Driven port for task persistence.
//!
//! Every operation is scoped by owner. A task that belongs to someone else is
//! indistinguishable from one that does not exist, so adapters must filter on
//! the owner in the same statement that touches the row.

use async_trait::async_trait;

use crate::domain::OwnerId;
use crate::domain::tasks::{Task, TaskDraft, TaskId, TaskListFilter};

use super::define_port_error;

define_port_error! {
    /// Errors raised by task repository adapters.
    pub enum TaskRepositoryError {
        /// The store could not be reached or a connection could not be checked out.
        Connection { message: String } =>
            "task repository connection failed: {message}",
        /// A statement failed while executing.
        Query { message: String } =>
            "task repository query failed: {message}",
        /// No task with this id exists for the owner.
        NotFound { task_id: TaskId } =>
            "task {task_id} not found",
    }
}

/// Owner-scoped task storage.
///
/// Each mutation is atomic with respect to the single row it touches.
/// Timestamps are assigned by the adapter: `created_at == updated_at` on
/// creation, and every successful update or completion change strictly
/// increases `updated_at`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Persist a new, not yet completed task and assign it a fresh id.
    async fn create(&self, owner: &OwnerId, draft: &TaskDraft)
    -> Result<Task, TaskRepositoryError>;

    /// Fetch one task, or `None` when it is absent or owned by someone else.
    async fn get(&self, owner: &OwnerId, task_id: TaskId)
    -> Result<Option<Task>, TaskRepositoryError>;

    /// All of the owner's tasks passing `filter`, oldest first.
    ///
    /// Ties on `created_at` are broken by ascending id.
    async fn list(
        &self,
        owner: &OwnerId,
        filter: TaskListFilter,
    ) -> Result<Vec<Task>, TaskRepositoryError>;

    /// Replace title and description, keeping completion and creation time.
    ///
    /// Fails with [`TaskRepositoryError::NotFound`] when no owned task matches.
    async fn update(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        draft: &TaskDraft,
    ) -> Result<Task, TaskRepositoryError>;

    /// Set the completion flag. Setting the current value is legal and still
    /// refreshes `updated_at`.
    ///
    /// Fails with [`TaskRepositoryError::NotFound`] when no owned task matches.
    async fn set_completed(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<Task, TaskRepositoryError>;

    /// Hard-delete a task, reporting whether a row was removed.
    async fn delete(&self, owner: &OwnerId, task_id: TaskId) -> Result<bool, TaskRepositoryError>;
}
