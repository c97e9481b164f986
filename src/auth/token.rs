//! Signed, time-limited access tokens (HS256 JWT).

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::domain::User;

/// Lifetime of an issued token.
pub const TOKEN_TTL: TimeDelta = TimeDelta::seconds(3600);

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// The identity a verified token proves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issues a token for `user` valid for [`TOKEN_TTL`] from `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if signing fails.
    pub fn issue(&self, user: &User, issued_at: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at + TOKEN_TTL;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|error| AuthError::Internal(format!("token signing failed: {error}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature and expiry and returns the token's claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any malformed, tampered or
    /// expired token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| {
                tracing::debug!(%error, "Token rejected");
                AuthError::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("TokenKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use rstest::{fixture, rstest};

    #[fixture]
    fn keys() -> TokenKeys {
        TokenKeys::new(&SecretString::from("test-secret"))
    }

    #[fixture]
    fn user() -> User {
        User::new(UserId::generate(), "ada", "hash")
    }

    #[rstest]
    fn test_issue_then_verify(keys: TokenKeys, user: User) {
        let issued = keys.issue(&user, Utc::now()).unwrap();
        let claims = keys.verify(&issued.token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(issued.expires_at.timestamp(), claims.exp);
    }

    #[rstest]
    fn test_expired_token_rejected(keys: TokenKeys, user: User) {
        let issued = keys
            .issue(&user, Utc::now() - TimeDelta::seconds(3601))
            .unwrap();
        assert!(matches!(keys.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[rstest]
    fn test_token_from_other_secret_rejected(keys: TokenKeys, user: User) {
        let other = TokenKeys::new(&SecretString::from("another-secret"));
        let issued = other.issue(&user, Utc::now()).unwrap();
        assert!(matches!(keys.verify(&issued.token), Err(AuthError::InvalidToken)));
    }

    #[rstest]
    #[case("")]
    #[case("not-a-jwt")]
    #[case("a.b.c")]
    fn test_malformed_token_rejected(keys: TokenKeys, #[case] token: &str) {
        assert!(matches!(keys.verify(token), Err(AuthError::InvalidToken)));
    }

    #[rstest]
    fn test_identity_from_claims() {
        let identity = Identity::from(Claims {
            sub: "42".to_string(),
            username: "ada".to_string(),
            iat: 0,
            exp: 3600,
        });
        assert_eq!(identity.user_id, "42");
        assert_eq!(identity.username, "ada");
    }
}
