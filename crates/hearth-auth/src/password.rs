//! Password hashing and verification.
//!
//! Uses Argon2id (hybrid mode) with default parameters and an OsRng salt.
//! Hashes are PHC strings suitable for storage in the user store.
//!
//! # Example
//!
//! ```
//! use hearth_auth::password::{hash_password, verify_password};
//!
//! let hash = hash_password("hunter2").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(verify_password("hunter2", &hash).unwrap());
//! assert!(!verify_password("wrong", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::AuthResult;
use crate::error::AuthError;

/// Hashes a plaintext password for storage.
///
/// # Errors
///
/// Returns an error if hashing fails (rare).
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored PHC hash.
///
/// A mismatch returns `Ok(false)`; only a malformed stored hash is an
/// error.
///
/// # Errors
///
/// Returns an error if the stored hash cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::internal(format!("malformed password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
