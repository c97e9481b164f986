//! Server-sent event stream of sweep notifications.
//!
//! Browsers cannot set headers on an `EventSource`, so the token may also be
//! passed as the `access_token` query parameter.

use std::convert::Infallible;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, header::AUTHORIZATION},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use serde::Deserialize;

use super::dto::TaskResponse;
use super::error::ApiErrorResponse;
use super::handlers::AppState;
use crate::auth::{AuthError, Identity};
use crate::notification::NotificationEvent;

/// Query parameters accepted by `GET /events`.
#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub access_token: Option<String>,
}

fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    query: &EventsQuery,
) -> Result<Identity, AuthError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let header = value.to_str().map_err(|_| AuthError::InvalidToken)?;
        return state.auth.authenticate(Some(header));
    }
    match query.access_token.as_deref() {
        Some(token) => state.auth.verify_token(token),
        None => Err(AuthError::MissingToken),
    }
}

fn to_sse_event(event: &NotificationEvent) -> Event {
    let payload = TaskResponse::from(event.task());
    Event::default()
        .event(event.name())
        .json_data(&payload)
        .unwrap_or_else(|error| {
            tracing::error!(%error, task_id = %payload.id, "Failed to encode event");
            Event::default().event(event.name()).comment("encoding failed")
        })
}

/// Subscribes the caller to notification events.
///
/// Each event is named `notification` and carries the task JSON. Only events
/// published while the connection is open are delivered. Closing the
/// connection unsubscribes.
///
/// # Errors
///
/// Returns 401 without a valid token.
pub async fn notification_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiErrorResponse> {
    let identity = authenticate(&state, &headers, &query)?;
    tracing::info!(user = %identity.username, "Event stream opened");

    let subscription = state.broadcaster.subscribe();
    let events = stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        Some((Ok(to_sse_event(&event)), subscription))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
