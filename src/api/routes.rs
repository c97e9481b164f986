//! Router assembly.

use std::any::Any;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{login, register};
use super::error::ApiErrorResponse;
use super::events::notification_events;
use super::handlers::{AppState, create_task, health_check};
use super::query::{current_notifications, get_task, list_tasks, upcoming_tasks};
use super::transaction::{delete_task, update_task};

fn api_routes() -> Router<AppState> {
    Router::new()
        // Tasks
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/upcoming", get(upcoming_tasks))
        .route("/tasks/notifications", get(current_notifications))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        // Push channel
        .route("/events", get(notification_events))
}

fn handle_panic(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    ApiErrorResponse::internal_error("An internal error occurred").into_response()
}

/// Wraps `router` in the panic, trace and CORS layers.
///
/// A panicking handler answers with the generic 500 [`ApiErrorResponse`].
pub fn with_middleware<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods(AnyOrigin)
        .allow_headers(AnyOrigin);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Builds the application router.
///
/// Task, auth and event routes are served both at the root and under `/api`.
pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(health_check))
        .merge(api_routes())
        .nest("/api", api_routes());

    with_middleware(routes).with_state(state)
}
