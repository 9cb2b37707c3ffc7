//! Failures surfaced by the task service.

use serde_json::json;
use thiserror::Error;

use crate::domain::DomainError;
use crate::domain::ports::TaskRepositoryError;

use super::{TaskId, TaskValidationError};

/// Typed outcome of a failed task operation.
///
/// Inbound adapters map each kind to a fixed response category; nothing is
/// retried inside the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskServiceError {
    /// Input failed a field rule; nothing was written.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    /// The task does not exist for this owner.
    #[error("task {task_id} not found")]
    NotFound { task_id: TaskId },
    /// The store is unreachable or returned an unexpected fault.
    #[error("task storage failed: {message}")]
    Storage { message: String, retryable: bool },
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(value: TaskRepositoryError) -> Self {
        match value {
            TaskRepositoryError::NotFound { task_id } => Self::NotFound { task_id },
            TaskRepositoryError::Connection { message } => Self::Storage {
                message,
                retryable: true,
            },
            TaskRepositoryError::Query { message } => Self::Storage {
                message,
                retryable: false,
            },
        }
    }
}

impl From<TaskServiceError> for DomainError {
    fn from(value: TaskServiceError) -> Self {
        match value {
            TaskServiceError::Validation(err) => Self::invalid_request(err.to_string())
                .with_details(json!({
                    "field": err.field(),
                    "code": err.code(),
                })),
            TaskServiceError::NotFound { task_id } => {
                Self::not_found(format!("task {task_id} not found")).with_details(json!({
                    "taskId": task_id.get(),
                }))
            }
            TaskServiceError::Storage {
                retryable: true, ..
            } => Self::service_unavailable("task storage is temporarily unavailable"),
            TaskServiceError::Storage { message, .. } => {
                Self::internal(format!("task storage failed: {message}"))
            }
        }
    }
}
