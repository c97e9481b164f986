//! Repository traits for domain entities.
//!
//! Every operation returns a boxed `'static` future so implementations can be
//! held behind `Arc<dyn ...>` in the shared application state and awaited from
//! request handlers and the notification sweep alike.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{ScheduleError, Task, TaskId, TaskPatch, Timestamp, User};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Entity was not found.
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A revision produced an invalid due schedule.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),

    /// The backing store failed.
    #[error("Storage error: {0}")]
    StorageError(String),
}

// =============================================================================
// Task Repository
// =============================================================================

/// The task store.
///
/// Reads observe every mutation that completed before them. `upcoming`,
/// `due_now` and `mark_notified` take the reference instant explicitly so the
/// caller decides what "now" is.
pub trait TaskRepository: Send + Sync {
    /// Lists all tasks in insertion order.
    fn list(&self) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Finds a task by its ID.
    fn find_by_id(&self, id: &TaskId) -> BoxFuture<'static, Result<Option<Task>, RepositoryError>>;

    /// Appends a new task.
    ///
    /// Returns `RepositoryError::Conflict` if a task with the same ID exists.
    fn insert(&self, task: &Task) -> BoxFuture<'static, Result<(), RepositoryError>>;

    /// Applies `patch` to the stored task atomically and returns the result.
    ///
    /// Returns `RepositoryError::NotFound` for an unknown ID and
    /// `RepositoryError::InvalidSchedule` if the merged due fields are invalid;
    /// the stored task is unchanged in both cases.
    fn update(
        &self,
        id: &TaskId,
        patch: TaskPatch,
    ) -> BoxFuture<'static, Result<Task, RepositoryError>>;

    /// Deletes a task by its ID.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: &TaskId) -> BoxFuture<'static, Result<bool, RepositoryError>>;

    /// Tasks whose notification instant is strictly after `now`, ascending by
    /// notification instant.
    fn upcoming(&self, now: Timestamp) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Tasks whose notification instant is at or before `now` and that have
    /// not been notified yet.
    fn due_now(&self, now: Timestamp) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Flags every task `due_now(now)` would return as notified and returns
    /// the flagged tasks. Selection and flagging happen under one lock.
    fn mark_notified(
        &self,
        now: Timestamp,
    ) -> BoxFuture<'static, Result<Vec<Task>, RepositoryError>>;

    /// Counts all tasks.
    fn count(&self) -> BoxFuture<'static, Result<usize, RepositoryError>>;
}

// =============================================================================
// User Repository
// =============================================================================

/// The registered-user list.
pub trait UserRepository: Send + Sync {
    /// Adds a user.
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    fn insert(&self, user: &User) -> BoxFuture<'static, Result<(), RepositoryError>>;

    /// Finds a user by exact username.
    fn find_by_username(
        &self,
        username: &str,
    ) -> BoxFuture<'static, Result<Option<User>, RepositoryError>>;
}

// =============================================================================
// Tests
// =============================================================================
