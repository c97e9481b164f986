//! Domain module for task management.
//!
//! This module contains domain models, value objects, and the due-time
//! calculations shared by the store and the notification sweep.

pub mod schedule;
pub mod task;
pub mod user;

pub use schedule::{
    DueSchedule, NOTIFICATION_LEAD, ScheduleError, combine_date_time, notification_time,
};
pub use task::{Priority, Task, TaskDraft, TaskId, TaskPatch, Timestamp};
pub use user::{User, UserId};
