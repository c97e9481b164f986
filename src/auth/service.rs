//! Registration, login and bearer-token authentication.

use std::sync::{Arc, LazyLock};

use chrono::Utc;
use secrecy::SecretString;

use super::password::{hash_password, verify_password};
use super::token::{Identity, IssuedToken, TokenKeys};
use super::AuthError;
use crate::domain::{User, UserId};
use crate::infrastructure::{RepositoryError, UserRepository};

const BEARER_PREFIX: &str = "Bearer ";

/// Password behind [`STAND_IN_HASH`].
const STAND_IN_PASSWORD: &str = "no-such-user";

/// Hash verified when the username is unknown, so both login failures cost
/// one Argon2 run.
static STAND_IN_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password(STAND_IN_PASSWORD).ok());

/// The auth gate. Independent of the task store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository + Send + Sync>,
    keys: TokenKeys,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository + Send + Sync>, secret: &SecretString) -> Self {
        Self {
            users,
            keys: TokenKeys::new(secret),
        }
    }

    /// Creates a user with a salted password hash.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` if either field is blank
    /// - `AuthError::UsernameTaken` if the username exists
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|error| AuthError::Internal(format!("hashing task failed: {error}")))??;

        let user = User::new(UserId::generate(), username, password_hash);
        self.users.insert(&user).await.map_err(|error| match error {
            RepositoryError::Conflict(_) => AuthError::UsernameTaken(user.username.clone()),
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Verifies credentials and issues a one-hour token.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingCredentials` if either field is blank
    /// - `AuthError::InvalidCredentials` for an unknown user or wrong password
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let user = self.users.find_by_username(username).await?;

        let password = password.to_string();
        let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
        let matches = tokio::task::spawn_blocking(move || {
            match stored_hash.as_deref().or(STAND_IN_HASH.as_deref()) {
                Some(hash) => verify_password(&password, hash),
                None => Ok(false),
            }
        })
        .await
        .map_err(|error| AuthError::Internal(format!("verification task failed: {error}")))??;

        match user {
            Some(user) if matches => self.keys.issue(&user, Utc::now()),
            _ => {
                tracing::debug!(username, "Login rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Authenticates the raw value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingToken` if the header is absent
    /// - `AuthError::InvalidToken` if it is not `Bearer <token>` or the token
    ///   fails verification
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Identity, AuthError> {
        let header = authorization.ok_or(AuthError::MissingToken)?;
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::InvalidToken)?;
        self.verify_token(token)
    }

    /// Verifies a bare token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if verification fails.
    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        self.keys.verify(token).map(Identity::from)
    }
}
