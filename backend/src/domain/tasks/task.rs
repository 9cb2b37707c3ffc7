//! Task record and identifiers.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::OwnerId;

/// Error returned when a task identifier is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("task id must be positive (got {0})")]
pub struct InvalidTaskId(pub i64);

/// Positive identifier assigned by the repository at creation.
///
/// Identifiers are never reused, even after the task is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TaskId(i64);

impl TaskId {
    /// Construct a task identifier, rejecting zero and negative values.
    ///
    /// # Examples
    /// ```
    /// use taskflow::domain::tasks::TaskId;
    ///
    /// assert_eq!(TaskId::new(7).map(TaskId::get), Ok(7));
    /// assert!(TaskId::new(0).is_err());
    /// ```
    pub const fn new(value: i64) -> Result<Self, InvalidTaskId> {
        if value <= 0 {
            return Err(InvalidTaskId(value));
        }
        Ok(Self(value))
    }

    /// Underlying numeric value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for TaskId {
    type Error = InvalidTaskId;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaskId> for i64 {
    fn from(value: TaskId) -> Self {
        value.0
    }
}

/// One todo item owned by a single user.
///
/// Tasks are only built by repository adapters through
/// [`Task::from_persisted`]; callers mutate them through the service, which
/// replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    owner_id: OwnerId,
    title: String,
    description: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for rebuilding a [`Task`] from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTask {
    pub id: TaskId,
    pub owner_id: OwnerId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Rebuild a task from a persisted row.
    #[must_use]
    pub fn from_persisted(data: PersistedTask) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            completed: data.completed,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Decompose the task back into its persisted fields.
    #[must_use]
    pub fn into_persisted(self) -> PersistedTask {
        PersistedTask {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    #[must_use]
    pub const fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Narrows a task listing.
///
/// The default filter returns every task the owner has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskListFilter {
    /// Only return tasks whose completion flag matches.
    pub completed: Option<bool>,
}

impl TaskListFilter {
    /// Whether `task` passes the filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.completed.is_none_or(|wanted| task.completed() == wanted)
    }
}

/// Smallest step, in microseconds, `updated_at` advances by on a mutation.
pub const MIN_TIMESTAMP_STEP_MICROS: i64 = 1;

/// Timestamp for a mutation of a record last stamped at `previous`.
///
/// Returns `now`, unless the clock has not moved past `previous` (coarse
/// clocks, or skew between application hosts), in which case the stamp is
/// bumped by [`MIN_TIMESTAMP_STEP_MICROS`] so `updated_at` still strictly increases.
#[must_use]
pub fn next_mutation_stamp(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + TimeDelta::microseconds(MIN_TIMESTAMP_STEP_MICROS);
    if now < floor { floor } else { now }
}
