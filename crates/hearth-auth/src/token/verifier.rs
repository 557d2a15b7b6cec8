//! Token verification.
//!
//! Validates presented bearer tokens in a fixed order, short-circuiting on
//! the first failure:
//!
//! 1. Signature against the issuer's public key
//! 2. Time bounds (`nbf` ≤ now < `exp`)
//! 3. Issuer/audience match
//! 4. Revocation lookup (session id for access tokens, `jti` for refresh
//!    tokens)
//!
//! Every failure is a distinct [`VerifyError`] variant so callers can map
//! outcomes correctly: `Expired` should prompt a refresh, while `Revoked`
//! and `BadSignature` must force a re-login.

use std::sync::Arc;

use tracing::debug;

use crate::revocation::{RevocationStore, TokenKind};
use crate::token::jwt::{AccessTokenClaims, JwtError, JwtService, RefreshTokenClaims};

/// Reasons a token fails verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// The token could not be parsed, or its claims do not match this
    /// issuer/audience.
    #[error("Malformed token: {message}")]
    Malformed {
        /// Description of the parse/claims failure.
        message: String,
    },

    /// The token's expiry has passed.
    #[error("Token expired")]
    Expired,

    /// The token's not-before bound is in the future.
    #[error("Token not yet valid")]
    NotYetValid,

    /// The signature does not match the issuer's key.
    #[error("Invalid token signature")]
    BadSignature,

    /// The token was explicitly revoked before its natural expiry.
    #[error("Token revoked")]
    Revoked,
}

impl VerifyError {
    /// Creates a new `Malformed` error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::BadSignature => "bad_signature",
            Self::Revoked => "revoked",
        }
    }

    /// Returns `true` if the holder should be forced to re-login rather
    /// than refresh.
    #[must_use]
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, Self::BadSignature | Self::Revoked)
    }
}

impl From<JwtError> for VerifyError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::Expired,
            JwtError::NotYetValid => Self::NotYetValid,
            JwtError::InvalidSignature => Self::BadSignature,
            // Claims that don't match this issuer/audience, unparseable
            // tokens and everything else: not a token we ever minted.
            other => Self::malformed(other.to_string()),
        }
    }
}

/// Validates bearer tokens, including the revocation check.
pub struct TokenVerifier {
    /// JWT service for signature and claims validation.
    jwt: Arc<JwtService>,

    /// Revocation store consulted after the stateless checks pass.
    revocations: Arc<RevocationStore>,
}

impl TokenVerifier {
    /// Creates a new verifier.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>, revocations: Arc<RevocationStore>) -> Self {
        Self { jwt, revocations }
    }

    /// Verifies an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`VerifyError`].
    pub async fn verify_access(&self, token: &str) -> Result<AccessTokenClaims, VerifyError> {
        let claims = self
            .jwt
            .decode::<AccessTokenClaims>(token)
            .map_err(|e| {
                debug!(error = %e, "Access token failed stateless checks");
                VerifyError::from(e)
            })?
            .claims;

        if self
            .revocations
            .is_revoked(TokenKind::Session, &claims.sid)
            .await
        {
            debug!(sid = %claims.sid, "Access token revoked");
            return Err(VerifyError::Revoked);
        }

        Ok(claims)
    }

    /// Verifies a refresh token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a [`VerifyError`].
    pub async fn verify_refresh(&self, token: &str) -> Result<RefreshTokenClaims, VerifyError> {
        let claims = self
            .jwt
            .decode::<RefreshTokenClaims>(token)
            .map_err(|e| {
                debug!(error = %e, "Refresh token failed stateless checks");
                VerifyError::from(e)
            })?
            .claims;

        if self
            .revocations
            .is_revoked(TokenKind::Refresh, &claims.jti)
            .await
        {
            debug!(jti = %claims.jti, "Refresh token revoked");
            return Err(VerifyError::Revoked);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryCache;
    use crate::token::jwt::SigningKeyPair;
    use time::{Duration, OffsetDateTime};

    fn jwt() -> Arc<JwtService> {
        let key = SigningKeyPair::generate_rsa("test-key").expect("keygen");
        Arc::new(JwtService::new(key, "https://auth.test", "https://api.test"))
    }

    fn verifier(jwt: Arc<JwtService>) -> (TokenVerifier, Arc<RevocationStore>) {
        let revocations = Arc::new(RevocationStore::new(
            Arc::new(MemoryCache::new()),
            Duration::minutes(180),
            Duration::days(7),
        ));
        (TokenVerifier::new(jwt, revocations.clone()), revocations)
    }

    fn access_claims(lifetime: Duration) -> AccessTokenClaims {
        AccessTokenClaims::new(
            "https://auth.test",
            "https://api.test",
            "user-1",
            "a@x.com",
            "member",
            lifetime,
        )
    }

    #[tokio::test]
    async fn test_valid_access_token_passes() {
        let jwt = jwt();
        let (verifier, _) = verifier(jwt.clone());

        let claims = access_claims(Duration::hours(3));
        let token = jwt.encode(&claims).unwrap();

        let verified = verifier.verify_access(&token).await.unwrap();
        assert_eq!(verified.sub, "user-1");
        assert_eq!(verified.sid, claims.sid);
    }

    #[tokio::test]
    async fn test_revoked_session_fails_with_revoked() {
        let jwt = jwt();
        let (verifier, revocations) = verifier(jwt.clone());

        let claims = access_claims(Duration::hours(3));
        let token = jwt.encode(&claims).unwrap();

        revocations.revoke(TokenKind::Session, &claims.sid).await;
        assert_eq!(
            verifier.verify_access(&token).await,
            Err(VerifyError::Revoked)
        );
    }

    #[tokio::test]
    async fn test_expired_beats_revoked() {
        let jwt = jwt();
        let (verifier, revocations) = verifier(jwt.clone());

        // Well past expiry, beyond any decoding leeway.
        let mut claims = access_claims(Duration::hours(1));
        let past = OffsetDateTime::now_utc().unix_timestamp() - 7200;
        claims.iat = past;
        claims.nbf = past;
        claims.exp = past + 60;
        let token = jwt.encode(&claims).unwrap();

        revocations.revoke(TokenKind::Session, &claims.sid).await;

        // Time bounds are checked before revocation.
        assert_eq!(
            verifier.verify_access(&token).await,
            Err(VerifyError::Expired)
        );
    }

    #[tokio::test]
    async fn test_not_yet_valid_token_rejected() {
        let jwt = jwt();
        let (verifier, _) = verifier(jwt.clone());

        let mut claims = access_claims(Duration::hours(3));
        claims.nbf = OffsetDateTime::now_utc().unix_timestamp() + 3600;
        let token = jwt.encode(&claims).unwrap();

        assert_eq!(
            verifier.verify_access(&token).await,
            Err(VerifyError::NotYetValid)
        );
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let (verifier, _) = verifier(jwt());
        assert!(matches!(
            verifier.verify_access("garbage").await,
            Err(VerifyError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_refresh_revocation_is_independent_of_session() {
        let jwt = jwt();
        let (verifier, revocations) = verifier(jwt.clone());

        let refresh = RefreshTokenClaims::new(
            "https://auth.test",
            "https://api.test",
            "user-1",
            "a@x.com",
            Duration::days(7),
        );
        let token = jwt.encode(&refresh).unwrap();

        // Revoking a session id does not touch refresh ids.
        revocations.revoke(TokenKind::Session, &refresh.jti).await;
        assert!(verifier.verify_refresh(&token).await.is_ok());

        revocations.revoke(TokenKind::Refresh, &refresh.jti).await;
        assert_eq!(
            verifier.verify_refresh(&token).await,
            Err(VerifyError::Revoked)
        );
    }
}
