//! Salted one-way password hashing (Argon2id, PHC string format).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use super::AuthError;

/// Hashes `password` with a freshly generated salt.
///
/// # Errors
///
/// Returns `AuthError::Internal` if the hasher fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| AuthError::Internal(format!("password hashing failed: {error}")))
}

/// Checks `password` against a stored PHC hash.
///
/// # Errors
///
/// Returns `AuthError::Internal` if `stored_hash` is not a valid PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|error| AuthError::Internal(format!("stored hash is malformed: {error}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(error) => Err(AuthError::Internal(format!(
            "password verification failed: {error}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[rstest]
    fn test_hash_is_salted() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[rstest]
    fn test_verify_rejects_malformed_hash() {
        let result = verify_password("anything", "plaintext");
        assert!(matches!(result, Err(AuthError::Internal(_))));
    }
}
