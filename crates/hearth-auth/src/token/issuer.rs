//! Token issuance.
//!
//! Mints signed access/refresh token pairs for validated users. Issuance is
//! pure apart from generating fresh random identifiers and reading the
//! clock: it touches no store, and by design never invalidates any prior
//! token for the same user; concurrent sessions are allowed.

use std::sync::Arc;

use time::Duration;
use tracing::debug;

use crate::storage::UserRecord;
use crate::token::jwt::{AccessTokenClaims, JwtError, JwtService, RefreshTokenClaims};

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TokenPair {
    /// Short-lived bearer credential for API calls.
    pub access_token: String,

    /// Longer-lived credential for obtaining new access tokens.
    pub refresh_token: String,
}

/// Mints access and refresh tokens.
pub struct TokenIssuer {
    /// JWT service holding the only private key.
    jwt: Arc<JwtService>,

    /// Access token lifetime.
    access_lifetime: Duration,

    /// Refresh token lifetime.
    refresh_lifetime: Duration,
}

impl TokenIssuer {
    /// Creates a new issuer.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>, access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        Self {
            jwt,
            access_lifetime,
            refresh_lifetime,
        }
    }

    /// Mints an access/refresh pair for a validated user.
    ///
    /// # Errors
    ///
    /// Returns an error only if signing fails.
    pub fn issue_pair(&self, user: &UserRecord) -> Result<TokenPair, JwtError> {
        let access_claims = self.access_claims(user);
        let refresh_claims = RefreshTokenClaims::new(
            self.jwt.issuer(),
            self.jwt.audience(),
            &user.id,
            &user.email,
            self.refresh_lifetime,
        );

        let access_token = self.jwt.encode(&access_claims)?;
        let refresh_token = self.jwt.encode(&refresh_claims)?;

        debug!(
            subject = %user.id,
            sid = %access_claims.sid,
            jti = %refresh_claims.jti,
            "Issued token pair"
        );

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Mints an access token only (the OTP login path issues no refresh
    /// token).
    ///
    /// # Errors
    ///
    /// Returns an error only if signing fails.
    pub fn issue_access(&self, user: &UserRecord) -> Result<String, JwtError> {
        let claims = self.access_claims(user);
        let token = self.jwt.encode(&claims)?;
        debug!(subject = %user.id, sid = %claims.sid, "Issued access token");
        Ok(token)
    }

    fn access_claims(&self, user: &UserRecord) -> AccessTokenClaims {
        AccessTokenClaims::new(
            self.jwt.issuer(),
            self.jwt.audience(),
            &user.id,
            &user.email,
            &user.role,
            self.access_lifetime,
        )
    }
}
