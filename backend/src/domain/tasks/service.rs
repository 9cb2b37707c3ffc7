//! Task service implementing the driving ports.
//!
//! The service owns validation sequencing: fields are validated fully, title
//! before description, before any repository call, so a rejected request never
//! writes. It trusts the owner it is handed; identity checks happen in the
//! inbound adapter.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::OwnerId;
use crate::domain::ports::{
    CreateTaskRequest, TaskCommand, TaskQuery, TaskRepository, TaskRepositoryError,
    ToggleCompletionRequest, UpdateTaskRequest,
};

use super::{Task, TaskDraft, TaskId, TaskListFilter, TaskServiceError};

/// Task service backed by a [`TaskRepository`].
///
/// `R` may be unsized, so a server choosing its store at runtime can hold a
/// `TaskService<dyn TaskRepository>`.
pub struct TaskService<R: ?Sized> {
    repository: Arc<R>,
}

impl<R: ?Sized> Clone for TaskService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ?Sized> TaskService<R> {
    /// Create a service over the given repository.
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

fn storage_failure(
    operation: &'static str,
    owner_id: &OwnerId,
    task_id: Option<TaskId>,
    error: TaskRepositoryError,
) -> TaskServiceError {
    if !matches!(error, TaskRepositoryError::NotFound { .. }) {
        warn!(
            operation,
            owner_id = %owner_id,
            task_id = task_id.map(TaskId::get),
            error = %error,
            "task repository call failed"
        );
    }
    TaskServiceError::from(error)
}

#[async_trait]
impl<R> TaskCommand for TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    async fn create_task(&self, request: CreateTaskRequest) -> Result<Task, TaskServiceError> {
        let CreateTaskRequest {
            owner_id,
            title,
            description,
        } = request;
        let draft = TaskDraft::validate(&title, description.as_deref())?;
        let task = self
            .repository
            .create(&owner_id, &draft)
            .await
            .map_err(|err| storage_failure("create_task", &owner_id, None, err))?;
        debug!(owner_id = %owner_id, task_id = task.id().get(), "task created");
        Ok(task)
    }

    async fn update_task(&self, request: UpdateTaskRequest) -> Result<Task, TaskServiceError> {
        let UpdateTaskRequest {
            owner_id,
            task_id,
            title,
            description,
        } = request;
        let draft = TaskDraft::validate(&title, description.as_deref())?;
        let task = self
            .repository
            .update(&owner_id, task_id, &draft)
            .await
            .map_err(|err| storage_failure("update_task", &owner_id, Some(task_id), err))?;
        debug!(owner_id = %owner_id, task_id = task_id.get(), "task updated");
        Ok(task)
    }

    async fn toggle_completion(
        &self,
        request: ToggleCompletionRequest,
    ) -> Result<Task, TaskServiceError> {
        let ToggleCompletionRequest {
            owner_id,
            task_id,
            completed,
        } = request;
        let task = self
            .repository
            .set_completed(&owner_id, task_id, completed)
            .await
            .map_err(|err| storage_failure("toggle_completion", &owner_id, Some(task_id), err))?;
        debug!(
            owner_id = %owner_id,
            task_id = task_id.get(),
            completed,
            "task completion set"
        );
        Ok(task)
    }

    async fn delete_task(
        &self,
        owner_id: &OwnerId,
        task_id: TaskId,
    ) -> Result<bool, TaskServiceError> {
        let removed = self
            .repository
            .delete(owner_id, task_id)
            .await
            .map_err(|err| storage_failure("delete_task", owner_id, Some(task_id), err))?;
        debug!(owner_id = %owner_id, task_id = task_id.get(), removed, "task delete handled");
        Ok(removed)
    }
}

#[async_trait]
impl<R> TaskQuery for TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    async fn list_tasks(
        &self,
        owner_id: &OwnerId,
        filter: TaskListFilter,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = self
            .repository
            .list(owner_id, filter)
            .await
            .map_err(|err| storage_failure("list_tasks", owner_id, None, err))?;
        debug!(owner_id = %owner_id, count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    async fn get_task(&self, owner_id: &OwnerId, task_id: TaskId) -> Result<Task, TaskServiceError> {
        self.repository
            .get(owner_id, task_id)
            .await
            .map_err(|err| storage_failure("get_task", owner_id, Some(task_id), err))?
            .ok_or(TaskServiceError::NotFound { task_id })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
