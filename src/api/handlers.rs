//! HTTP handlers for the Task Notification API.
//!
//! Shared state lives here together with the task creation and health
//! endpoints. Read-only task endpoints are in [`super::query`], mutations in
//! [`super::transaction`].

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::auth::AuthenticatedUser;
use super::dto::{CreateTaskRequest, TaskResponse, validate_create_request};
use super::error::ApiErrorResponse;
use super::extract::JsonBody;
use crate::auth::AuthService;
use crate::domain::{Task, TaskId, Timestamp};
use crate::infrastructure::{TaskRepository, UserRepository};
use crate::notification::EventBroadcaster;

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
#[derive(Clone)]
pub struct AppState {
    /// The task store.
    pub task_repository: Arc<dyn TaskRepository + Send + Sync>,
    /// Registration, login and token verification.
    pub auth: AuthService,
    /// Hub the sweep publishes to and `/events` subscribes to.
    pub broadcaster: EventBroadcaster,
}

impl AppState {
    #[must_use]
    pub fn new(
        task_repository: Arc<dyn TaskRepository + Send + Sync>,
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        jwt_secret: &secrecy::SecretString,
        broadcaster: EventBroadcaster,
    ) -> Self {
        Self {
            task_repository,
            auth: AuthService::new(user_repository, jwt_secret),
            broadcaster,
        }
    }
}

/// Path parameters for `/tasks/{id}` routes.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPath {
    pub id: String,
}

impl TaskPath {
    /// Parses the path id. Any id that cannot name a stored task is reported
    /// as not found.
    ///
    /// # Errors
    ///
    /// Returns a 404 response if the id is not a valid task id.
    pub fn task_id(&self) -> Result<TaskId, ApiErrorResponse> {
        self.id
            .parse()
            .map_err(|_| ApiErrorResponse::not_found(format!("Task {} not found", self.id)))
    }
}

// =============================================================================
// POST /tasks Handler
// =============================================================================

/// Creates a new task.
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Pay rent",
///   "description": "Optional",
///   "dueDate": "2025-06-01",
///   "dueTime": "10:00",
///   "priority": "High|Medium|Low",
///   "status": false
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the stored task, with derived times filled in
/// - **400 Bad Request**: blank title, missing or malformed due fields
/// - **401 Unauthorized**: missing or invalid bearer token
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for validation, auth and store failures.
pub async fn create_task(
    user: AuthenticatedUser,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let draft = validate_create_request(&request)?;
    let task = Task::create(TaskId::generate(), draft, Timestamp::now())?;

    state.task_repository.insert(&task).await?;

    tracing::debug!(
        task_id = %task.id,
        user = %user.username,
        notification_time = %task.schedule.notification_time,
        "Task created"
    );

    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
