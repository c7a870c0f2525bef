//! Password hashing and verification.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Failure to produce a password hash.
#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct AuthError(argon2::password_hash::Error);

/// Hash a password with a fresh OS-random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(AuthError)?;
    Ok(hash.to_string())
}

/// Check a candidate password against a stored PHC string.
///
/// A malformed stored hash counts as a failed match rather than an
/// error; the caller cannot do anything smarter with it than reject
/// the login.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("user123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("user123", &hash));
        assert!(!verify_password("user124", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_stored_hash_rejects() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}
