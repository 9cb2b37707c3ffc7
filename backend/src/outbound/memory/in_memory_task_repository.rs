//! In-memory [`TaskRepository`] for tests and database-less runs.
//!
//! Each instance owns its state; nothing is shared process-wide. A single
//! `RwLock` guards the map and the id counter, so every operation is atomic
//! with respect to the row it touches.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::OwnerId;
use crate::domain::ports::{TaskRepository, TaskRepositoryError};
use crate::domain::tasks::{
    PersistedTask, Task, TaskDraft, TaskId, TaskListFilter, next_mutation_stamp,
};

#[derive(Debug, Default)]
struct State {
    tasks: BTreeMap<TaskId, Task>,
    last_id: i64,
}

/// Thread-safe task store backed by a `BTreeMap`.
///
/// Ids come from a counter that only moves forward, so deleted ids are never
/// handed out again.
#[derive(Clone)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<State>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryTaskRepository {
    /// Create an empty store stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, TaskRepositoryError> {
        self.state
            .read()
            .map_err(|err| TaskRepositoryError::connection(err.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, TaskRepositoryError> {
        self.state
            .write()
            .map_err(|err| TaskRepositoryError::connection(err.to_string()))
    }

    /// Apply `change` to an owned task, refreshing `updated_at`.
    fn mutate<F>(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        change: F,
    ) -> Result<Task, TaskRepositoryError>
    where
        F: FnOnce(&mut PersistedTask),
    {
        let mut state = self.write()?;
        let slot = state
            .tasks
            .get_mut(&task_id)
            .filter(|task| task.owner_id() == owner)
            .ok_or(TaskRepositoryError::NotFound { task_id })?;

        let mut fields = slot.clone().into_persisted();
        change(&mut fields);
        fields.updated_at = next_mutation_stamp(self.clock.utc(), fields.updated_at);
        *slot = Task::from_persisted(fields);
        Ok(slot.clone())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(
        &self,
        owner: &OwnerId,
        draft: &TaskDraft,
    ) -> Result<Task, TaskRepositoryError> {
        let mut state = self.write()?;
        let next = state
            .last_id
            .checked_add(1)
            .ok_or_else(|| TaskRepositoryError::query("task id space exhausted"))?;
        let id = TaskId::new(next).map_err(|err| TaskRepositoryError::query(err.to_string()))?;
        let now = self.clock.utc();
        let task = Task::from_persisted(PersistedTask {
            id,
            owner_id: owner.clone(),
            title: draft.title.as_str().to_owned(),
            description: draft.description.as_str().to_owned(),
            completed: false,
            created_at: now,
            updated_at: now,
        });
        state.last_id = next;
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn get(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
    ) -> Result<Option<Task>, TaskRepositoryError> {
        let state = self.read()?;
        Ok(state
            .tasks
            .get(&task_id)
            .filter(|task| task.owner_id() == owner)
            .cloned())
    }

    async fn list(
        &self,
        owner: &OwnerId,
        filter: TaskListFilter,
    ) -> Result<Vec<Task>, TaskRepositoryError> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.owner_id() == owner && filter.matches(task))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn update(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        draft: &TaskDraft,
    ) -> Result<Task, TaskRepositoryError> {
        self.mutate(owner, task_id, |fields| {
            fields.title = draft.title.as_str().to_owned();
            fields.description = draft.description.as_str().to_owned();
        })
    }

    async fn set_completed(
        &self,
        owner: &OwnerId,
        task_id: TaskId,
        completed: bool,
    ) -> Result<Task, TaskRepositoryError> {
        self.mutate(owner, task_id, |fields| fields.completed = completed)
    }

    async fn delete(&self, owner: &OwnerId, task_id: TaskId) -> Result<bool, TaskRepositoryError> {
        let mut state = self.write()?;
        let owned = state
            .tasks
            .get(&task_id)
            .is_some_and(|task| task.owner_id() == owner);
        if owned {
            state.tasks.remove(&task_id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        Arc::new(MutableClock::new(start))
    }

    fn repo(clock: &Arc<MutableClock>) -> InMemoryTaskRepository {
        let clock: Arc<dyn Clock> = clock.clone();
        InMemoryTaskRepository::new(clock)
    }

    fn owner(name: &str) -> OwnerId {
        OwnerId::new(name).expect("valid owner")
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft::validate(title, None).expect("valid draft")
    }

    #[rstest]
    #[tokio::test]
    async fn ids_are_not_reused_after_delete(clock: Arc<MutableClock>) {
        let repo = repo(&clock);
        let alice = owner("alice");
        let first = repo.create(&alice, &draft("one")).await.expect("create");
        assert!(repo.delete(&alice, first.id()).await.expect("delete"));

        let second = repo.create(&alice, &draft("two")).await.expect("create");
        assert!(second.id() > first.id());
    }

    #[rstest]
    #[tokio::test]
    async fn foreign_tasks_are_invisible(clock: Arc<MutableClock>) {
        let repo = repo(&clock);
        let task = repo
            .create(&owner("alice"), &draft("secret"))
            .await
            .expect("create");
        let bob = owner("bob");

        assert_eq!(repo.get(&bob, task.id()).await.expect("get"), None);
        assert_eq!(
            repo.set_completed(&bob, task.id(), true).await,
            Err(TaskRepositoryError::not_found(task.id()))
        );
        assert!(!repo.delete(&bob, task.id()).await.expect("delete"));
        assert!(
            repo.list(&bob, TaskListFilter::default())
                .await
                .expect("list")
                .is_empty()
        );
    }

    #[rstest]
    #[tokio::test]
    async fn updated_at_strictly_increases_with_a_frozen_clock(clock: Arc<MutableClock>) {
        let repo = repo(&clock);
        let alice = owner("alice");
        let created = repo.create(&alice, &draft("task")).await.expect("create");
        assert_eq!(created.created_at(), created.updated_at());

        let first = repo
            .set_completed(&alice, created.id(), true)
            .await
            .expect("complete");
        let second = repo
            .set_completed(&alice, created.id(), true)
            .await
            .expect("complete again");

        assert!(second.completed());
        assert!(first.updated_at() > created.updated_at());
        assert!(second.updated_at() > first.updated_at());
        assert_eq!(second.created_at(), created.created_at());
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_completion_and_creation_time(clock: Arc<MutableClock>) {
        let repo = repo(&clock);
        let alice = owner("alice");
        let created = repo.create(&alice, &draft("draft")).await.expect("create");
        repo.set_completed(&alice, created.id(), true)
            .await
            .expect("complete");
        clock.advance_seconds(60);

        let updated = repo
            .update(&alice, created.id(), &draft("final"))
            .await
            .expect("update");
        assert_eq!(updated.title(), "final");
        assert!(updated.completed());
        assert_eq!(updated.created_at(), created.created_at());
        assert_eq!(updated.owner_id(), &alice);
    }

    #[rstest]
    #[tokio::test]
    async fn list_orders_by_creation_then_id_and_filters(clock: Arc<MutableClock>) {
        let repo = repo(&clock);
        let alice = owner("alice");
        let a = repo.create(&alice, &draft("a")).await.expect("create");
        let b = repo.create(&alice, &draft("b")).await.expect("create");
        clock.advance_seconds(1);
        let c = repo.create(&alice, &draft("c")).await.expect("create");
        repo.set_completed(&alice, b.id(), true)
            .await
            .expect("complete");

        let all: Vec<TaskId> = repo
            .list(&alice, TaskListFilter::default())
            .await
            .expect("list")
            .iter()
            .map(Task::id)
            .collect();
        assert_eq!(all, vec![a.id(), b.id(), c.id()]);

        let open: Vec<TaskId> = repo
            .list(
                &alice,
                TaskListFilter {
                    completed: Some(false),
                },
            )
            .await
            .expect("list")
            .iter()
            .map(Task::id)
            .collect();
        assert_eq!(open, vec![a.id(), c.id()]);
    }
}
