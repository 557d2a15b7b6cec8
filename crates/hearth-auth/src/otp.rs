//! One-time passcode challenge store.
//!
//! Short-lived, single-use numeric codes keyed by destination. Codes are
//! stored in the primary TTL cache; on a primary-tier outage the store
//! degrades to a process-local in-memory tier that does track expiry, so a
//! cache outage never extends a code's life.
//!
//! One destination holds at most one live code: issuing a new code
//! overwrites any prior one. Verification is single-use (a matching code
//! is deleted before the result is returned) and does not reveal whether
//! a failure was a mismatch, an expired code, or no code at all.
//!
//! Dispatch (email/SMS) is the orchestrator's job, never this store's.

use std::sync::Arc;

use rand::Rng;
use time::Duration;
use tracing::{debug, error, warn};

use crate::AuthResult;
use crate::storage::{MemoryCache, TtlCache};

/// Number of digits in a generated code.
const CODE_DIGITS: u32 = 6;

/// Store of live one-time passcodes.
pub struct OtpStore {
    /// Primary tier: shared TTL cache.
    primary: Arc<dyn TtlCache>,

    /// Fallback tier: in-process cache, consulted only on primary errors.
    fallback: MemoryCache,

    /// Code lifetime.
    lifetime: Duration,
}

impl OtpStore {
    /// Creates a store over the given primary tier.
    #[must_use]
    pub fn new(primary: Arc<dyn TtlCache>, lifetime: Duration) -> Self {
        Self {
            primary,
            fallback: MemoryCache::new(),
            lifetime,
        }
    }

    /// Issues a fresh code for `destination`, overwriting any live code.
    ///
    /// Returns the code for the caller to dispatch. Issuance itself cannot
    /// fail except through both tiers failing, and the in-process tier
    /// never does.
    ///
    /// # Errors
    ///
    /// Reserved for future backends; the current fallback tier is
    /// infallible.
    pub async fn issue(&self, destination: &str) -> AuthResult<String> {
        let code = generate_code();
        let key = challenge_key(destination);

        match self
            .primary
            .set_with_ttl(&key, &code, self.lifetime)
            .await
        {
            Ok(()) => {
                // A prior outage may have left a live code in the fallback;
                // one destination holds at most one live code across tiers.
                let _ = self.fallback.delete(&key).await;
                debug!(
                    destination = %destination,
                    ttl_seconds = self.lifetime.whole_seconds(),
                    "One-time code issued"
                );
            }
            Err(e) => {
                error!(
                    destination = %destination,
                    error = %e,
                    "Primary challenge tier unreachable; one-time code held in process-local fallback only"
                );
                self.fallback.set_with_ttl(&key, &code, self.lifetime).await?;
            }
        }

        Ok(code)
    }

    /// Verifies `code` against the live challenge for `destination`.
    ///
    /// On a match the stored code is deleted (single-use) and `true` is
    /// returned. A mismatch, an expired code and a missing code are all
    /// `false`, indistinguishably.
    pub async fn verify(&self, destination: &str, code: &str) -> bool {
        let key = challenge_key(destination);

        let stored = match self.primary.get(&key).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(
                    destination = %destination,
                    error = %e,
                    "Primary challenge tier unreachable; consulting process-local fallback"
                );
                // The fallback tier is in-process and infallible.
                self.fallback.get(&key).await.unwrap_or(None)
            }
        };

        match stored {
            Some(expected) if expected == code => {
                self.invalidate(destination).await;
                debug!(destination = %destination, "One-time code accepted");
                true
            }
            _ => {
                debug!(destination = %destination, "One-time code rejected");
                false
            }
        }
    }

    /// Removes any live challenge for `destination` from both tiers.
    pub async fn invalidate(&self, destination: &str) {
        let key = challenge_key(destination);
        if let Err(e) = self.primary.delete(&key).await {
            warn!(
                destination = %destination,
                error = %e,
                "Primary challenge tier unreachable while invalidating code"
            );
        }
        // Always clear the fallback too, in case an earlier write degraded.
        let _ = self.fallback.delete(&key).await;
    }
}

fn challenge_key(destination: &str) -> String {
    format!("otp:{destination}")
}

/// Generates a uniformly random zero-padded numeric code.
fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(0..10u32.pow(CODE_DIGITS));
    format!("{code:0width$}", width = CODE_DIGITS as usize)
}
