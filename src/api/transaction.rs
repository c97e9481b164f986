//! Task mutation endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::auth::AuthenticatedUser;
use super::dto::{TaskResponse, UpdateTaskRequest, validate_update_request};
use super::error::ApiErrorResponse;
use super::extract::JsonBody;
use super::handlers::{AppState, TaskPath};

// =============================================================================
// PUT /tasks/{id}
// =============================================================================

/// Updates a task.
///
/// Supplied fields replace stored ones and omitted fields are kept. Derived
/// times are recomputed; `notificationSent` is cleared only when the
/// notification instant moves.
///
/// # Response
///
/// - **200 OK**: the updated task
/// - **400 Bad Request**: blank title or malformed due fields
/// - **401 Unauthorized**: missing or invalid bearer token
/// - **404 Not Found**: no task with this id
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above.
pub async fn update_task(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
    JsonBody(request): JsonBody<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let task_id = path.task_id()?;
    let patch = validate_update_request(&request)?;

    let task = state.task_repository.update(&task_id, patch).await?;

    tracing::debug!(
        task_id = %task.id,
        user = %user.username,
        notification_sent = task.notification_sent,
        "Task updated"
    );

    Ok(Json(TaskResponse::from(&task)))
}

// =============================================================================
// DELETE /tasks/{id}
// =============================================================================

/// Deletes a task. Idempotent: an unknown id also answers 204.
///
/// # Errors
///
/// Returns 401 without a valid token, 500 if the store fails.
pub async fn delete_task(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
) -> Result<StatusCode, ApiErrorResponse> {
    let Ok(task_id) = path.task_id() else {
        return Ok(StatusCode::NO_CONTENT);
    };

    let removed = state.task_repository.delete(&task_id).await?;
    tracing::debug!(task_id = %task_id, removed, "Task delete requested");

    Ok(StatusCode::NO_CONTENT)
}
