//! Authentication gate.
//!
//! Users register with a username and password (stored as an Argon2id hash)
//! and log in to receive an HS256 token valid for one hour. Protected
//! operations require `Authorization: Bearer <token>`.

pub mod password;
pub mod service;
pub mod token;

use thiserror::Error;

use crate::infrastructure::RepositoryError;

pub use service::AuthService;
pub use token::{Claims, Identity, IssuedToken, TOKEN_TTL, TokenKeys};

/// Errors produced by the auth gate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Username or password absent or blank.
    #[error("Username and password are required")]
    MissingCredentials,

    /// The username is already registered.
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// Unknown user or wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No `Authorization` header was supplied.
    #[error("Authentication required")]
    MissingToken,

    /// The bearer token is malformed, tampered with or expired.
    #[error("Invalid token")]
    InvalidToken,

    /// The user store failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Hashing or signing failed.
    #[error("Internal auth error: {0}")]
    Internal(String),
}
