//! User storage trait.
//!
//! The relational user store is an external collaborator of this subsystem;
//! only the lookup/update seam it must satisfy is defined here. Password
//! hashes are stored in PHC string format (see [`crate::password`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::types::Destination;

/// A user record as exposed by the relational user store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user id (the token `sub` claim).
    pub id: String,

    /// Email address.
    pub email: String,

    /// Role name placed in access tokens.
    pub role: String,

    /// Argon2 PHC password hash.
    pub password_hash: String,
}

/// Storage trait for user lookup and password update.
///
/// # Implementations
///
/// Provided by the platform's user service; tests use an in-memory map.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails. An unknown email is `None`,
    /// not an error.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<UserRecord>>;

    /// Finds a user by a one-time-code destination (email or phone).
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails. An unknown destination is
    /// `None`, not an error.
    async fn find_by_destination(&self, destination: &Destination)
    -> AuthResult<Option<UserRecord>>;

    /// Replaces the stored password hash for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the write fails.
    async fn update_password(&self, user_id: &str, new_hash: &str) -> AuthResult<()>;
}
