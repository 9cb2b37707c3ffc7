//! PostgreSQL-backed [`TaskRepository`] using Diesel.
//!
//! Every operation is a single statement filtered on both `id` and
//! `owner_id`, so row-level atomicity comes from PostgreSQL and a foreign
//! owner's row is never touched or revealed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Text, Timestamptz};
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::OwnerId;
use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::tasks::{PersistedTask, Task, TaskDraft, TaskId, TaskListFilter};

use super::faults::Fault;
use super::models::{NewTaskRow, TaskRow};
use super::pool::{DbPool, PoolError};
use super::schema::tasks;

const UPDATE_FIELDS_SQL: &str = concat!(
    "UPDATE tasks SET title = $1, description = $2, ",
    "updated_at = GREATEST($3, updated_at + INTERVAL '1 microsecond') ",
    "WHERE id = $4 AND owner_id = $5 ",
    "RETURNING id, owner_id, title, description, completed, created_at, updated_at",
);

const SET_COMPLETED_SQL: &str = concat!(
    "UPDATE tasks SET completed = $1, ",
    "updated_at = GREATEST($2, updated_at + INTERVAL '1 microsecond') ",
    "WHERE id = $3 AND owner_id = $4 ",
    "RETURNING id, owner_id, title, description, completed, created_at, updated_at",
);

/// Diesel implementation of the task repository port.
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselTaskRepository {
    /// Create a repository over `pool`, stamping rows with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

fn map_pool_error(error: PoolError) -> TaskRepositoryError {
    Fault::from(error).into()
}

fn map_diesel_error(error: diesel::result::Error) -> TaskRepositoryError {
    Fault::from(error).into()
}

fn row_to_task(row: TaskRow) -> Result<Task, TaskRepositoryError> {
    let id = TaskId::new(row.id).map_err(|err| TaskRepositoryError::query(err.to_string()))?;
    let owner_id = OwnerId::new(row.owner_id).map_err(|err| {
        TaskRepositoryError::query(format!("stored owner id for task {id} is invalid: {err}"))
    })?;
    Ok(Task::from_persisted(PersistedTask {
        id,
        owner_id,
        title: row.title,
        description: row.description,
        completed: row.completed,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn found_or_missing(
    row: Option<TaskRow>,
    task_id: TaskId,
) -> Result<Task, TaskRepositoryError> {
    row.map_or(Err(TaskRepositoryError::not_found(task_id)), row_to_task)
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn create(
        &self,
        owner: &OwnerId,
        draft: &TaskDraft,
    ) -> Result<Task, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let now = self.now();
        let row = NewTaskRow {
            owner_id: owner.as_str(),
            title: draft.title.as_str(),
            description: draft.description.as_str(),
            completed: false,
            created_at: now,
            updated_at: now,
        };

        let inserted = diesel::insert_into(tasks::table)
            .values(&row)
            .returning(TaskRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        row_to_task(inserted)
    }

    async fn get(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaskRow> = tasks::table
            .filter(tasks::id.eq(task_id.get()))
            .filter(tasks::owner_id.eq(owner.as_str()))
            .select(TaskRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_task).transpose()
    }

    async fn list(
        &self,
        owner: &OwnerId,
        filter: TaskListFilter,
    ) -> Result<Vec<Task>, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = tasks::table
            .select(TaskRow::as_select())
            .filter(tasks::owner_id.eq(owner.as_str()))
            .into_boxed();
        if let Some(completed) = filter.completed {
            query = query.filter(tasks::completed.eq(completed));
        }

        let rows: Vec<TaskRow> = query
            .order((tasks::created_at.asc(), tasks::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_task).collect()
    }

    async fn update(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        draft: &TaskDraft,
    ) -> Result<Task, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaskRow> = diesel::sql_query(UPDATE_FIELDS_SQL)
            .bind::<Text, _>(draft.title.as_str())
            .bind::<Text, _>(draft.description.as_str())
            .bind::<Timestamptz, _>(self.now())
            .bind::<BigInt, _>(task_id.get())
            .bind::<Text, _>(owner.as_str())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        found_or_missing(row, task_id)
    }

    async fn set_completed(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<Task, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<TaskRow> = diesel::sql_query(SET_COMPLETED_SQL)
            .bind::<Bool, _>(completed)
            .bind::<Timestamptz, _>(self.now())
            .bind::<BigInt, _>(task_id.get())
            .bind::<Text, _>(owner.as_str())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        found_or_missing(row, task_id)
    }

    async fn delete(&self, owner: &OwnerId, task_id: TaskId) -> Result<bool, TaskRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            tasks::table
                .filter(tasks::id.eq(task_id.get()))
                .filter(tasks::owner_id.eq(owner.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
