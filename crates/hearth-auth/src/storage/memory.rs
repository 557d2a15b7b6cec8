//! In-memory TTL cache.
//!
//! Process-local [`TtlCache`] backed by a mutex-guarded map. Serves as the
//! value-carrying fallback tier for the OTP store and as the cache backend
//! in tests. Entries are expiry-checked (and dropped) on read; there is no
//! background sweep, so memory use is bounded by process lifetime, which is
//! acceptable for a fallback tier.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use time::{Duration, OffsetDateTime};

use crate::AuthResult;
use crate::storage::TtlCache;

/// An entry with its absolute expiry time.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: OffsetDateTime,
}

/// In-memory, process-local TTL cache.
///
/// Explicitly constructed and dependency-injected, never a process-wide
/// singleton, so tests can build isolated instances.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live (non-expired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.lock().values().filter(|e| e.expires_at > now).count()
    }

    /// Returns `true` if the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: OffsetDateTime::now_utc() + ttl,
        };
        self.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > OffsetDateTime::now_utc() => {
                Ok(Some(entry.value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "v", Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value_and_ttl() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "old", Duration::minutes(5))
            .await
            .unwrap();
        cache
            .set_with_ttl("k", "new", Duration::minutes(5))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let cache = MemoryCache::new();
        cache
            .set_with_ttl("k", "v", Duration::seconds(-1))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_missing_delete_is_ok() {
        let cache = MemoryCache::new();
        cache.delete("never-set").await.unwrap();
    }
}
