//! Read-only task endpoints.

use axum::{
    Json,
    extract::{Path, State},
};

use super::auth::AuthenticatedUser;
use super::dto::TaskResponse;
use super::error::ApiErrorResponse;
use super::handlers::{AppState, TaskPath};
use crate::domain::{Task, Timestamp};

fn to_responses(tasks: &[Task]) -> Vec<TaskResponse> {
    tasks.iter().map(TaskResponse::from).collect()
}

// =============================================================================
// GET /tasks
// =============================================================================

/// Lists every task in creation order.
///
/// # Errors
///
/// Returns 401 without a valid token, 500 if the store fails.
pub async fn list_tasks(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.task_repository.list().await?;
    Ok(Json(to_responses(&tasks)))
}

// =============================================================================
// GET /tasks/{id}
// =============================================================================

/// Returns a single task.
///
/// # Errors
///
/// Returns 404 for an unknown id and 401 without a valid token.
pub async fn get_task(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task_id = path.task_id()?;
    let task = state
        .task_repository
        .find_by_id(&task_id)
        .await?
        .ok_or_else(|| ApiErrorResponse::not_found(format!("Task {task_id} not found")))?;
    Ok(Json(TaskResponse::from(&task)))
}

// =============================================================================
// GET /tasks/upcoming
// =============================================================================

/// Lists tasks whose notification instant is still in the future, soonest
/// first.
///
/// # Errors
///
/// Returns 401 without a valid token, 500 if the store fails.
pub async fn upcoming_tasks(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.task_repository.upcoming(Timestamp::now()).await?;
    Ok(Json(to_responses(&tasks)))
}

// =============================================================================
// GET /tasks/notifications
// =============================================================================

/// Lists tasks that are due for notification and have not been notified
/// yet. Reading does not flag them; only the sweep does.
///
/// # Errors
///
/// Returns 401 without a valid token, 500 if the store fails.
pub async fn current_notifications(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiErrorResponse> {
    let tasks = state.task_repository.due_now(Timestamp::now()).await?;
    Ok(Json(to_responses(&tasks)))
}
