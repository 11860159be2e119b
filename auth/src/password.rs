//! Password hashing with Argon2id.
//!
//! Hashes are PHC strings, so the salt and parameters travel with the hash.
//! Both functions are CPU-bound; async callers should run them on the
//! blocking pool (see [`hash_password_blocking`]).

use crate::error::{AuthError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash a password with a fresh random salt.
///
/// # Errors
///
/// Returns [`AuthError::CryptoError`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::CryptoError(format!("Password hashing failed: {e}")))
}

/// Check a password against a stored hash.
///
/// A malformed stored hash is treated as a mismatch rather than an error so
/// a corrupt record can never be logged into.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// [`hash_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns [`AuthError::CryptoError`] if hashing fails or the task panics.
pub async fn hash_password_blocking(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::CryptoError(format!("Hashing task failed: {e}")))?
}

/// [`verify_password`] on the blocking thread pool.
///
/// # Errors
///
/// Returns [`AuthError::CryptoError`] if the task panics.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::CryptoError(format!("Verification task failed: {e}")))
}
