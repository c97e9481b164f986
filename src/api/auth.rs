//! Bearer-token extractor and the `/auth` endpoints.

use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
};

use super::dto::{CredentialsRequest, TokenResponse, UserResponse, validate_credentials};
use super::error::ApiErrorResponse;
use super::extract::JsonBody;
use super::handlers::AppState;
use crate::auth::{AuthError, Identity};

// =============================================================================
// Extractor
// =============================================================================

/// The identity behind a verified `Authorization: Bearer <token>` header.
///
/// Handlers that take this extractor reject unauthenticated requests with
/// 401 before touching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Identity);

impl std::ops::Deref for AuthenticatedUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| AuthError::InvalidToken))
            .transpose()?;

        let identity = state.auth.authenticate(header)?;
        Ok(Self(identity))
    }
}

// =============================================================================
// POST /auth/register
// =============================================================================

/// Registers a user.
///
/// # Response
///
/// - **201 Created**: `{ "id": "...", "username": "..." }`
/// - **400 Bad Request**: missing username or password
/// - **409 Conflict**: username already taken
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiErrorResponse> {
    let (username, password) = validate_credentials(&request)?;
    let user = state.auth.register(&username, &password).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// =============================================================================
// POST /auth/login
// =============================================================================

/// Exchanges credentials for a one-hour bearer token.
///
/// # Response
///
/// - **200 OK**: `{ "token": "...", "expiresAt": "..." }`
/// - **400 Bad Request**: missing username or password
/// - **401 Unauthorized**: unknown user or wrong password
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CredentialsRequest>,
) -> Result<Json<TokenResponse>, ApiErrorResponse> {
    let (username, password) = validate_credentials(&request)?;
    let issued = state.auth.login(&username, &password).await?;
    tracing::info!(username = %username, "User logged in");
    Ok(Json(TokenResponse::from(issued)))
}
