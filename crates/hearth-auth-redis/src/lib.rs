//! # hearth-auth-redis
//!
//! Redis backend for the `hearth-auth` TTL cache.
//!
//! This is the primary tier of the revocation and one-time-code stores: a
//! cache shared by every node, with expiry enforced by Redis itself. Every
//! command runs under a timeout so a slow or partitioned Redis degrades
//! into the stores' in-process fallback instead of stalling requests.
//!
//! # Example
//!
//! ```no_run
//! use hearth_auth_redis::RedisCache;
//! use std::time::Duration;
//!
//! # async fn example() -> hearth_auth::AuthResult<()> {
//! let cache = RedisCache::connect("redis://127.0.0.1:6379", Duration::from_secs(2)).await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use hearth_auth::AuthResult;
use hearth_auth::config::CacheConfig;
use hearth_auth::error::AuthError;
use hearth_auth::storage::TtlCache;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use time::Duration;

/// Redis-backed TTL cache.
///
/// `Clone` is cheap: each clone shares the same [`ConnectionManager`],
/// which multiplexes commands over one reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    command_timeout: StdDuration,
}

impl RedisCache {
    /// Connects to Redis and builds the connection manager.
    ///
    /// # Errors
    /// Returns a configuration error for a malformed URL and a storage
    /// error if the initial connection fails.
    pub async fn connect(url: &str, command_timeout: StdDuration) -> AuthResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AuthError::configuration(format!("invalid redis url: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AuthError::storage(format!("redis connection failed: {e}")))?;

        tracing::info!(url = %redacted(url), "Connected to Redis cache");

        Ok(Self {
            conn,
            command_timeout,
        })
    }

    /// Connects using the cache section of the auth configuration.
    ///
    /// # Errors
    /// See [`RedisCache::connect`].
    pub async fn from_config(config: &CacheConfig) -> AuthResult<Self> {
        Self::connect(&config.url, config.command_timeout).await
    }

    /// Runs a redis future under the configured command timeout.
    async fn bounded<T>(
        &self,
        op: &'static str,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.command_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AuthError::storage(format!("redis {op} failed: {e}"))),
            Err(_) => Err(AuthError::storage(format!(
                "redis {op} timed out after {:?}",
                self.command_timeout
            ))),
        }
    }
}

#[async_trait]
impl TtlCache for RedisCache {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        // SETEX rejects non-positive expiries; clamp to one second.
        let ttl_seconds = ttl.whole_seconds().max(1) as u64;
        self.bounded("set", conn.set_ex::<_, _, ()>(key, value, ttl_seconds))
            .await
    }

    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        let mut conn = self.conn.clone();
        self.bounded("get", conn.get(key)).await
    }

    async fn delete(&self, key: &str) -> AuthResult<()> {
        let mut conn = self.conn.clone();
        self.bounded("del", conn.del::<_, ()>(key)).await
    }
}

/// Strips credentials from a redis URL before it reaches the logs.
fn redacted(url: &str) -> &str {
    match url.rsplit_once('@') {
        Some((_, host)) => host,
        None => url,
    }
}
