//! Dual-tier revocation store.
//!
//! Records "this session / refresh id is no longer valid" facts. Entries
//! live in the primary tier (the shared TTL cache) with a TTL equal to the
//! full lifetime of the token class, so a revocation never needs to outlive
//! the token it kills. When the primary tier is unreachable the store
//! degrades to a process-local fallback set with no expiry tracking.
//!
//! # Identifier hashing
//!
//! Identifiers are SHA-256 hashed before any store interaction, so a leaked
//! cache dump does not reveal usable session or refresh ids.
//!
//! # Fallback semantics
//!
//! The fallback tier is consulted only when the primary tier errors; the
//! two tiers are never merged or reconciled. A revocation written to the
//! fallback while the primary was down is therefore invisible to other
//! process replicas. This is a deliberate availability-over-durability
//! tradeoff: a logout must take local effect even with the cache down. The
//! condition is logged at `error!` level so operators can see every write
//! that degraded.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use sha2::{Digest, Sha256};
use time::Duration;
use tracing::{debug, error, warn};

use crate::storage::TtlCache;

/// The revocable token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Access tokens, revoked by session id.
    Session,
    /// Refresh tokens, revoked by refresh id (`jti`).
    Refresh,
}

impl TokenKind {
    /// Returns the kind as a key segment.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Refresh => "refresh",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dual-tier store of revoked token identifiers.
pub struct RevocationStore {
    /// Primary tier: shared TTL cache.
    primary: Arc<dyn TtlCache>,

    /// Fallback tier: process-local hashed-id set, no expiry tracking,
    /// bounded by process lifetime.
    fallback: Mutex<HashSet<String>>,

    /// Record TTL for session ids (the access token lifetime).
    session_ttl: Duration,

    /// Record TTL for refresh ids (the refresh token lifetime).
    refresh_ttl: Duration,
}

impl RevocationStore {
    /// Creates a store over the given primary tier.
    ///
    /// TTLs should match the corresponding token lifetimes: a revocation
    /// record may expire as soon as the token itself would have.
    #[must_use]
    pub fn new(primary: Arc<dyn TtlCache>, session_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            primary,
            fallback: Mutex::new(HashSet::new()),
            session_ttl,
            refresh_ttl,
        }
    }

    /// Marks an identifier as revoked.
    ///
    /// Never fails from the caller's point of view: on a primary-tier
    /// error the record is kept in the in-process fallback so that a
    /// revocation can never silently fail to take effect locally.
    pub async fn revoke(&self, kind: TokenKind, identifier: &str) {
        let key = Self::record_key(kind, identifier);
        let ttl = self.ttl_for(kind);

        match self.primary.set_with_ttl(&key, "1", ttl).await {
            Ok(()) => {
                debug!(kind = %kind, key = %key, ttl_seconds = ttl.whole_seconds(), "Revocation recorded");
            }
            Err(e) => {
                // Process-local only from here on. Other replicas will not
                // see this revocation until the primary tier recovers and
                // the credential is revoked again.
                error!(
                    kind = %kind,
                    key = %key,
                    error = %e,
                    "Primary revocation tier unreachable; recorded in process-local fallback only"
                );
                self.lock_fallback().insert(key);
            }
        }
    }

    /// Returns `true` if the identifier has been revoked.
    ///
    /// Checks the primary tier first; on a primary-tier error, falls back
    /// to the process-local set.
    pub async fn is_revoked(&self, kind: TokenKind, identifier: &str) -> bool {
        let key = Self::record_key(kind, identifier);

        match self.primary.get(&key).await {
            Ok(hit) => hit.is_some(),
            Err(e) => {
                warn!(
                    kind = %kind,
                    key = %key,
                    error = %e,
                    "Primary revocation tier unreachable; consulting process-local fallback"
                );
                self.lock_fallback().contains(&key)
            }
        }
    }

    /// Builds the store key for an identifier: the kind segment plus a
    /// one-way hash of the raw id.
    fn record_key(kind: TokenKind, identifier: &str) -> String {
        format!("revoked:{}:{}", kind.as_str(), hash_identifier(identifier))
    }

    fn ttl_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Session => self.session_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    fn lock_fallback(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.fallback.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One-way hash of a token identifier (SHA-256, hex encoded).
#[must_use]
pub fn hash_identifier(identifier: &str) -> String {
    hex::encode(Sha256::digest(identifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthResult;
    use crate::error::AuthError;
    use crate::storage::MemoryCache;
    use async_trait::async_trait;

    /// A primary tier that is always unreachable.
    struct DownCache;

    #[async_trait]
    impl TtlCache for DownCache {
        async fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> AuthResult<()> {
            Err(AuthError::storage("connection refused"))
        }
        async fn get(&self, _: &str) -> AuthResult<Option<String>> {
            Err(AuthError::storage("connection refused"))
        }
        async fn delete(&self, _: &str) -> AuthResult<()> {
            Err(AuthError::storage("connection refused"))
        }
    }

    fn store(primary: Arc<dyn TtlCache>) -> RevocationStore {
        RevocationStore::new(primary, Duration::minutes(180), Duration::days(7))
    }

    #[tokio::test]
    async fn test_revoke_and_check_via_primary() {
        let store = store(Arc::new(MemoryCache::new()));

        assert!(!store.is_revoked(TokenKind::Session, "sid-1").await);
        store.revoke(TokenKind::Session, "sid-1").await;
        assert!(store.is_revoked(TokenKind::Session, "sid-1").await);
    }

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let store = store(Arc::new(MemoryCache::new()));

        store.revoke(TokenKind::Session, "id-1").await;
        assert!(store.is_revoked(TokenKind::Session, "id-1").await);
        assert!(!store.is_revoked(TokenKind::Refresh, "id-1").await);
    }

    #[tokio::test]
    async fn test_fallback_continuity_when_primary_down() {
        let store = store(Arc::new(DownCache));

        store.revoke(TokenKind::Refresh, "jti-1").await;
        assert!(store.is_revoked(TokenKind::Refresh, "jti-1").await);
        assert!(!store.is_revoked(TokenKind::Refresh, "jti-never-added").await);
    }

    #[tokio::test]
    async fn test_primary_stores_hashed_keys_only() {
        let primary = Arc::new(MemoryCache::new());
        let store = store(primary.clone());

        store.revoke(TokenKind::Session, "raw-session-id").await;

        let raw_key = "revoked:session:raw-session-id";
        assert_eq!(primary.get(raw_key).await.unwrap(), None);

        let hashed_key = format!("revoked:session:{}", hash_identifier("raw-session-id"));
        assert!(primary.get(&hashed_key).await.unwrap().is_some());
    }

    #[test]
    fn test_hash_identifier_is_stable_hex() {
        let h = hash_identifier("abc");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_identifier("abc"));
        assert_ne!(h, hash_identifier("abd"));
    }
}
