//! Task entity, field rules and the service enforcing them.
//!
//! A task belongs to exactly one owner. Titles and descriptions are trimmed
//! and validated once, when a [`TaskDraft`] is built; repositories assign ids
//! and timestamps; the [`TaskService`] sequences validation before storage.

mod error;
mod service;
mod task;
mod validation;

pub use self::error::TaskServiceError;
pub use self::service::TaskService;
pub use self::task::{
    InvalidTaskId, MIN_TIMESTAMP_STEP_MICROS, PersistedTask, Task, TaskId, TaskListFilter,
    next_mutation_stamp,
};
pub use self::validation::{
    DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS, TaskDescription, TaskDraft, TaskTitle,
    TaskValidationError, validate_description, validate_title,
};
