//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod auth;
pub mod dto;
pub mod error;
pub mod events;
pub mod extract;
pub mod handlers;
pub mod query;
pub mod routes;
pub mod transaction;

pub use auth::{AuthenticatedUser, login, register};
pub use dto::{
    CreateTaskRequest, CredentialsRequest, TaskResponse, TokenResponse, UpdateTaskRequest,
    UserResponse,
};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use events::notification_events;
pub use extract::JsonBody;
pub use handlers::{AppState, HealthResponse, TaskPath, create_task, health_check};
pub use query::{current_notifications, get_task, list_tasks, upcoming_tasks};
pub use routes::{build_router, with_middleware};
pub use transaction::{delete_task, update_task};
