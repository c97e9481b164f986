//! Due-time calculations.
//!
//! A task carries its due moment as two user-supplied strings, a calendar
//! date and a time of day. This module turns them into a single instant and
//! derives the moment at which the owner should be notified.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use thiserror::Error;

/// How long before the due instant a notification fires.
pub const NOTIFICATION_LEAD: TimeDelta = TimeDelta::seconds(3600);

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Errors produced while interpreting due-date input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    Missing(&'static str),

    /// A field was present but could not be parsed.
    #[error("{field} '{value}' is not a valid {expected}")]
    Malformed {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl ScheduleError {
    /// Name of the offending input field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Missing(field) | Self::Malformed { field, .. } => field,
        }
    }
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM[:SS]` time into one instant.
///
/// The wall-clock value is taken as UTC as-is.
///
/// # Errors
///
/// Returns [`ScheduleError::Missing`] when either part is absent or blank and
/// [`ScheduleError::Malformed`] when either part fails to parse.
pub fn combine_date_time(
    date: Option<&str>,
    time: Option<&str>,
) -> Result<DateTime<Utc>, ScheduleError> {
    let date = non_blank(date).ok_or(ScheduleError::Missing("dueDate"))?;
    let time = non_blank(time).ok_or(ScheduleError::Missing("dueTime"))?;

    let date =
        NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| ScheduleError::Malformed {
            field: "dueDate",
            value: date.to_string(),
            expected: "date (YYYY-MM-DD)",
        })?;

    let time = TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
        // chrono accepts `:60` as a leap second; a due time never is one.
        .filter(|parsed| parsed.nanosecond() < 1_000_000_000)
        .ok_or_else(|| ScheduleError::Malformed {
            field: "dueTime",
            value: time.to_string(),
            expected: "time of day (HH:MM)",
        })?;

    Ok(NaiveDateTime::new(date, time).and_utc())
}

/// Returns the instant a notification should fire for the given due instant.
#[must_use]
pub fn notification_time(due_date_time: DateTime<Utc>) -> DateTime<Utc> {
    due_date_time - NOTIFICATION_LEAD
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The derived time fields of a task, always computed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueSchedule {
    /// The combined due instant.
    pub due_date_time: DateTime<Utc>,
    /// `due_date_time` minus [`NOTIFICATION_LEAD`].
    pub notification_time: DateTime<Utc>,
}

impl DueSchedule {
    /// Computes both derived fields from raw date and time input.
    ///
    /// # Errors
    ///
    /// Propagates any [`ScheduleError`] from [`combine_date_time`].
    pub fn compute(date: Option<&str>, time: Option<&str>) -> Result<Self, ScheduleError> {
        let due_date_time = combine_date_time(date, time)?;
        Ok(Self {
            due_date_time,
            notification_time: notification_time(due_date_time),
        })
    }
}
