//! Data Transfer Objects for API requests and responses.
//!
//! Field names are camelCase on the wire. Request fields are all optional at
//! the serde level so that missing values surface as field-level validation
//! errors rather than body rejections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{FieldError, ValidationError};
use crate::auth::IssuedToken;
use crate::domain::{Priority, Task, TaskDraft, TaskPatch, User, combine_date_time};

// =============================================================================
// Task DTOs
// =============================================================================

/// Request DTO for creating a new task.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// `HH:MM` or `HH:MM:SS`.
    pub due_time: Option<String>,
    /// Defaults to Medium.
    pub priority: Option<Priority>,
    /// Defaults to `false` (pending).
    pub status: Option<bool>,
}

/// Request DTO for updating a task. Omitted fields keep their stored value;
/// `id` and derived fields in the body are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<bool>,
}

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub due_time: String,
    pub due_date_time: DateTime<Utc>,
    pub priority: Priority,
    pub status: bool,
    pub notification_time: DateTime<Utc>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for TaskResponse {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.clone(),
            due_time: task.due_time.clone(),
            due_date_time: task.schedule.due_date_time,
            priority: task.priority,
            status: task.status,
            notification_time: task.schedule.notification_time,
            notification_sent: task.notification_sent,
            created_at: *task.created_at.as_datetime(),
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self::from(&task)
    }
}

// =============================================================================
// Auth DTOs
// =============================================================================

/// Request DTO for registration and login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Response DTO for a registered user. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
        }
    }
}

/// Response DTO for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Validates a task title: non-blank, trimmed.
///
/// # Errors
///
/// Returns `ValidationError` if the title is blank.
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::single("title", "Title is required"));
    }
    Ok(trimmed.to_string())
}

/// Validates a create request into a draft, reporting every bad field.
///
/// # Errors
///
/// Returns `ValidationError` listing the title and due-field problems found.
pub fn validate_create_request(request: &CreateTaskRequest) -> Result<TaskDraft, ValidationError> {
    let mut errors: Vec<FieldError> = Vec::new();

    let title = validate_title(request.title.as_deref().unwrap_or_default())
        .map_err(|error| errors.extend(error.errors))
        .ok();

    if let Err(error) = combine_date_time(request.due_date.as_deref(), request.due_time.as_deref())
    {
        errors.push(FieldError::new(error.field(), error.to_string()));
    }

    match (title, errors.is_empty()) {
        (Some(title), true) => Ok(TaskDraft {
            title,
            description: request.description.clone().unwrap_or_default(),
            due_date: request.due_date.clone().unwrap_or_default().trim().to_string(),
            due_time: request.due_time.clone().unwrap_or_default().trim().to_string(),
            priority: request.priority.unwrap_or_default(),
            status: request.status.unwrap_or(false),
        }),
        _ => Err(ValidationError::new(errors)),
    }
}

/// Validates an update request into a patch.
///
/// Due fields are checked when the patch is merged with the stored task.
///
/// # Errors
///
/// Returns `ValidationError` if a supplied title is blank.
pub fn validate_update_request(request: &UpdateTaskRequest) -> Result<TaskPatch, ValidationError> {
    let title = request.title.as_deref().map(validate_title).transpose()?;

    Ok(TaskPatch {
        title,
        description: request.description.clone(),
        due_date: request.due_date.as_deref().map(|date| date.trim().to_string()),
        due_time: request.due_time.as_deref().map(|time| time.trim().to_string()),
        priority: request.priority,
        status: request.status,
    })
}

/// Extracts the username and password from a credentials request.
///
/// # Errors
///
/// Returns `ValidationError` naming each absent or blank field.
pub fn validate_credentials(
    request: &CredentialsRequest,
) -> Result<(String, String), ValidationError> {
    let username = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|username| !username.is_empty());
    let password = request
        .password
        .as_deref()
        .filter(|password| !password.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok((username.to_string(), password.to_string())),
        (username, password) => {
            let mut errors = Vec::new();
            if username.is_none() {
                errors.push(FieldError::new("username", "Username is required"));
            }
            if password.is_none() {
                errors.push(FieldError::new("password", "Password is required"));
            }
            Err(ValidationError::new(errors))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
