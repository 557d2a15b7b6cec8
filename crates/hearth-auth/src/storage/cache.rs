//! TTL cache storage trait.
//!
//! Both the revocation store and the OTP challenge store sit on this one
//! abstraction: a string key/value store whose entries expire on their own.
//! The primary tier is a shared network cache; callers must treat every
//! method as fallible and degrade to their in-process fallback tier on
//! error.
//!
//! # Implementations
//!
//! - `hearth-auth-redis` - shared Redis backend (production)
//! - [`MemoryCache`](crate::storage::MemoryCache) - in-process map
//!   (fallback tier, tests)

use async_trait::async_trait;
use time::Duration;

use crate::AuthResult;

/// Storage trait for a key/value cache with per-entry TTL.
///
/// # Concurrency
///
/// Implementations are called from many concurrent request tasks and must
/// be `Send + Sync`. No method may block on another caller's in-flight
/// operation.
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Stores `value` under `key`, replacing any existing entry, expiring
    /// after `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or the write fails.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()>;

    /// Returns the live value under `key`, or `None` if absent or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable. Absence is not an
    /// error.
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;

    /// Removes the entry under `key`. Removing a missing key is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    async fn delete(&self, key: &str) -> AuthResult<()>;
}
