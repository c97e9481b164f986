//! Request body extractor.
//!
//! Wraps [`axum::Json`] so a body that fails to parse answers with the same
//! `VALIDATION_ERROR` shape as every other bad request.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use super::error::ApiErrorResponse;

/// JSON request body whose rejection is an [`ApiErrorResponse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiErrorResponse;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(request, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(ApiErrorResponse::from)
    }
}
