//! Password hashing and verification (Argon2id).
//!
//! [`hash`] generates a random salt via `OsRng` and returns a PHC-format
//! string (`$argon2id$v=19$...`) which is what the credential store persists.
//! [`verify`] checks a plaintext against a stored hash; a malformed stored
//! hash verifies as false rather than erroring, so login failures stay
//! indistinguishable from the caller's point of view.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::ApiError;

/// Hash a password with the default (memory-hard) Argon2id parameters.
pub fn hash(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
