//! In-memory repository implementations.
//!
//! All state lives in process memory and is lost on restart.
//!
//! - Thread-safe with `Arc<RwLock<...>>`; every operation takes the lock once
//!   and releases it before its future resolves
//! - Tasks keep insertion order through a monotonically increasing sequence
//!   number alongside the id index

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Task, TaskId, TaskPatch, Timestamp, User};
use crate::infrastructure::{RepositoryError, TaskRepository, UserRepository};

// =============================================================================
// Task Table
// =============================================================================

/// Tasks keyed by id, iterable in insertion order.
#[derive(Debug, Default)]
struct TaskTable {
    next_sequence: u64,
    by_sequence: BTreeMap<u64, Task>,
    sequence_of: HashMap<TaskId, u64>,
}

impl TaskTable {
    fn insert(&mut self, task: Task) -> Result<(), RepositoryError> {
        if self.sequence_of.contains_key(&task.id) {
            return Err(RepositoryError::Conflict(format!(
                "task {} already exists",
                task.id
            )));
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.sequence_of.insert(task.id.clone(), sequence);
        self.by_sequence.insert(sequence, task);
        Ok(())
    }

    fn get(&self, id: &TaskId) -> Option<&Task> {
        self.sequence_of
            .get(id)
            .and_then(|sequence| self.by_sequence.get(sequence))
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.sequence_of
            .get(id)
            .and_then(|sequence| self.by_sequence.get_mut(sequence))
    }

    fn remove(&mut self, id: &TaskId) -> bool {
        self.sequence_of
            .remove(id)
            .and_then(|sequence| self.by_sequence.remove(&sequence))
            .is_some()
    }

    fn iter(&self) -> impl Iterator<Item = &Task> {
        self.by_sequence.values()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.by_sequence.values_mut()
    }

    fn len(&self) -> usize {
        self.by_sequence.len()
    }
}

// =============================================================================
// In-Memory Task Repository
// =============================================================================

/// In-memory implementation of `TaskRepository`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<TaskTable>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn list(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move {
            let guard = tasks.read().await;
            Ok(guard.iter().cloned().collect())
        }
        .boxed()
    }

    fn find_by_id(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        async move {
            let guard = tasks.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn insert(&self, task: &Task) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let task = task.clone();
        async move {
            let mut guard = tasks.write().await;
            guard.insert(task)
        }
        .boxed()
    }

    fn update(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Task, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        async move {
            let mut guard = tasks.write().await;
            let Some(stored) = guard.get_mut(&id) else {
                return Err(RepositoryError::NotFound(format!("task {id}")));
            };
            match stored.revise(patch) {
                Ok(revised) => {
                    *stored = revised.clone();
                    Ok(revised)
                }
                Err(error) => Err(RepositoryError::from(error)),
            }
        }
        .boxed()
    }

    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        let id = id.clone();
        async move {
            let mut guard = tasks.write().await;
            Ok(guard.remove(&id))
        }
        .boxed()
    }

    fn upcoming(&self, now: Timestamp) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move {
            let guard = tasks.read().await;
            let mut upcoming: Vec<Task> = guard
                .iter()
                .filter(|task| task.is_upcoming(&now))
                .cloned()
                .collect();
            // Stable sort keeps insertion order among equal instants.
            upcoming.sort_by_key(|task| task.schedule.notification_time);
            Ok(upcoming)
        }
        .boxed()
    }

    fn due_now(&self, now: Timestamp) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move {
            let guard = tasks.read().await;
            Ok(guard
                .iter()
                .filter(|task| task.is_due(&now))
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn mark_notified(
        &self,
        now: Timestamp,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move {
            let mut guard = tasks.write().await;
            let flagged: Vec<Task> = guard
                .iter_mut()
                .filter(|task| task.is_due(&now))
                .map(|task| {
                    task.mark_notified();
                    task.clone()
                })
                .collect();
            Ok(flagged)
        }
        .boxed()
    }

    fn count(&self) -> BoxFuture<'static, Result<usize, RepositoryError>> {
        let tasks = Arc::clone(&self.tasks);
        async move { Ok(tasks.read().await.len()) }.boxed()
    }
}

// =============================================================================
// In-Memory User Repository
// =============================================================================

/// In-memory implementation of `UserRepository`, keyed by username.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory user repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: &User) -> BoxFuture<'static, Result<(), RepositoryError>> {
        let users = Arc::clone(&self.users);
        let user = user.clone();
        async move {
            let mut guard = users.write().await;
            if guard.contains_key(&user.username) {
                return Err(RepositoryError::Conflict(format!(
                    "username '{}' is already taken",
                    user.username
                )));
            }
            guard.insert(user.username.clone(), user);
            Ok(())
        }
        .boxed()
    }

    fn find_by_username(
        &self,
        username: &str,
    ) -> BoxFuture<'static, Result<Option<User>, RepositoryError>> {
        let users = Arc::clone(&self.users);
        let username = username.to_string();
        async move {
            let guard = users.read().await;
            Ok(guard.get(&username).cloned())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
