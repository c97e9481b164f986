//! Task domain model.
//!
//! A task's due instant and notification instant are derived values: they are
//! computed from `due_date` and `due_time` whenever a task is created or
//! revised and are never edited directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{DueSchedule, ScheduleError};

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Generates a new time-ordered `TaskId` (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// A timestamp wrapper for `DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

// =============================================================================
// Enums
// =============================================================================

/// The priority level of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    #[serde(alias = "high")]
    High,
    #[default]
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(formatter, "High"),
            Self::Medium => write!(formatter, "Medium"),
            Self::Low => write!(formatter, "Low"),
        }
    }
}

// =============================================================================
// Task
// =============================================================================

/// The user-editable fields of a task, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    /// Calendar date, `YYYY-MM-DD`.
    pub due_date: String,
    /// Time of day, `HH:MM` or `HH:MM:SS`.
    pub due_time: String,
    pub priority: Priority,
    /// `true` once the task is completed.
    pub status: bool,
}

/// A partial revision of a task. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<bool>,
}

/// A stored task.
///
/// `schedule` is always consistent with `due_date` and `due_time`, and
/// `notification_sent` only flips to `true` through [`Task::mark_notified`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub priority: Priority,
    pub status: bool,
    pub schedule: DueSchedule,
    pub notification_sent: bool,
    pub created_at: Timestamp,
}

impl Task {
    /// Builds a new task from a validated draft.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] when the draft's due date or time cannot be
    /// combined into an instant.
    pub fn create(
        id: TaskId,
        draft: TaskDraft,
        created_at: Timestamp,
    ) -> Result<Self, ScheduleError> {
        let schedule = DueSchedule::compute(Some(&draft.due_date), Some(&draft.due_time))?;
        Ok(Self {
            id,
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            due_time: draft.due_time,
            priority: draft.priority,
            status: draft.status,
            schedule,
            notification_sent: false,
            created_at,
        })
    }

    /// Returns a copy of this task with `patch` applied.
    ///
    /// Derived times are recomputed. `notification_sent` is kept unless the
    /// notification instant moved, in which case it is cleared so the task
    /// notifies again at its new time.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError`] when the merged due date or time is invalid.
    pub fn revise(&self, patch: TaskPatch) -> Result<Self, ScheduleError> {
        let due_date = patch.due_date.unwrap_or_else(|| self.due_date.clone());
        let due_time = patch.due_time.unwrap_or_else(|| self.due_time.clone());
        let schedule = DueSchedule::compute(Some(&due_date), Some(&due_time))?;
        let rescheduled = schedule.notification_time != self.schedule.notification_time;

        Ok(Self {
            id: self.id.clone(),
            title: patch.title.unwrap_or_else(|| self.title.clone()),
            description: patch
                .description
                .unwrap_or_else(|| self.description.clone()),
            due_date,
            due_time,
            priority: patch.priority.unwrap_or(self.priority),
            status: patch.status.unwrap_or(self.status),
            schedule,
            notification_sent: self.notification_sent && !rescheduled,
            created_at: self.created_at,
        })
    }

    /// Returns `true` when the notification instant has been reached and no
    /// notification has been sent yet.
    #[must_use]
    pub fn is_due(&self, now: &Timestamp) -> bool {
        !self.notification_sent && self.schedule.notification_time <= *now.as_datetime()
    }

    /// Returns `true` when the notification instant is strictly after `now`.
    #[must_use]
    pub fn is_upcoming(&self, now: &Timestamp) -> bool {
        self.schedule.notification_time > *now.as_datetime()
    }

    /// Records that the notification for this task has fired.
    pub const fn mark_notified(&mut self) {
        self.notification_sent = true;
    }
}

// =============================================================================
// Tests
// =============================================================================
