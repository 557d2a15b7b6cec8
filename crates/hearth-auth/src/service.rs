//! Auth orchestrator.
//!
//! Composes the credential store, token issuer/verifier, revocation store,
//! OTP challenge store and delivery collaborators into the public auth
//! operations. Each call is a fresh, request-scoped transition; the service
//! keeps no per-flow state and takes no per-user locks; two concurrent
//! logins for the same user legitimately produce two independent sessions.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::AuthResult;
use crate::dispatch::{EmailSender, OtpPurpose, SmsSender};
use crate::error::AuthError;
use crate::otp::OtpStore;
use crate::password::{hash_password, verify_password};
use crate::revocation::{RevocationStore, TokenKind};
use crate::storage::UserStore;
use crate::token::{TokenIssuer, TokenPair, TokenVerifier};
use crate::types::Destination;

/// The auth orchestrator.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    issuer: TokenIssuer,
    verifier: Arc<TokenVerifier>,
    revocations: Arc<RevocationStore>,
    otp: OtpStore,
    mailer: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
}

impl AuthService {
    /// Creates a new orchestrator from its collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        users: Arc<dyn UserStore>,
        issuer: TokenIssuer,
        verifier: Arc<TokenVerifier>,
        revocations: Arc<RevocationStore>,
        otp: OtpStore,
        mailer: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            users,
            issuer,
            verifier,
            revocations,
            otp,
            mailer,
            sms,
        }
    }

    /// Returns the token verifier shared with the request interceptor.
    #[must_use]
    pub fn verifier(&self) -> Arc<TokenVerifier> {
        self.verifier.clone()
    }

    /// Password login.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for both an unknown email and a wrong
    /// password; the two are deliberately indistinguishable to prevent
    /// account enumeration.
    #[instrument(skip_all, fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<TokenPair> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("Login rejected: unknown email");
            return Err(AuthError::unauthenticated("invalid credentials"));
        };

        if !verify_password(password, &user.password_hash)? {
            debug!(user_id = %user.id, "Login rejected: password mismatch");
            return Err(AuthError::unauthenticated("invalid credentials"));
        }

        let pair = self
            .issuer
            .issue_pair(&user)
            .map_err(|e| AuthError::internal(format!("token signing failed: {e}")))?;

        info!(user_id = %user.id, "Login succeeded");
        Ok(pair)
    }

    /// Logout.
    ///
    /// Requires a valid access token; revokes its session id. The refresh
    /// id is revoked only when the refresh token is supplied; an invalid
    /// supplied refresh token is ignored (logout stays idempotent and the
    /// session revocation still lands).
    ///
    /// # Errors
    ///
    /// Returns a verification error if the access token is not valid.
    #[instrument(skip_all)]
    pub async fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> AuthResult<()> {
        let claims = self.verifier.verify_access(access_token).await?;

        self.revocations
            .revoke(TokenKind::Session, &claims.sid)
            .await;

        if let Some(refresh_token) = refresh_token {
            match self.verifier.verify_refresh(refresh_token).await {
                Ok(refresh) => {
                    self.revocations
                        .revoke(TokenKind::Refresh, &refresh.jti)
                        .await;
                }
                Err(e) => {
                    debug!(error = %e, "Supplied refresh token not revocable; ignoring");
                }
            }
        }

        info!(user_id = %claims.sub, "Logout succeeded");
        Ok(())
    }

    /// Issues a login one-time code and dispatches it to `destination`.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if dispatch fails; the error never names
    /// the delivery channel.
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn send_otp(&self, destination: &Destination) -> AuthResult<()> {
        self.issue_and_dispatch(destination, OtpPurpose::Login).await
    }

    /// Verifies a login one-time code and mints an access token.
    ///
    /// No refresh token is issued on this path.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` on a code mismatch, an expired code, or a
    /// destination with no matching account.
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn verify_otp(&self, destination: &Destination, code: &str) -> AuthResult<String> {
        if !self.otp.verify(destination.address(), code).await {
            return Err(AuthError::unauthenticated("invalid code"));
        }

        let Some(user) = self.users.find_by_destination(destination).await? else {
            debug!("Code accepted but no matching account");
            return Err(AuthError::unauthenticated("invalid code"));
        };

        let token = self
            .issuer
            .issue_access(&user)
            .map_err(|e| AuthError::internal(format!("token signing failed: {e}")))?;

        info!(user_id = %user.id, "One-time code login succeeded");
        Ok(token)
    }

    /// Issues a password-reset one-time code and dispatches it.
    ///
    /// Same challenge store as login codes; only the message wording
    /// differs. Does not reveal whether the destination has an account.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryFailed` if dispatch fails.
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn forgot_password(&self, destination: &Destination) -> AuthResult<()> {
        self.issue_and_dispatch(destination, OtpPurpose::PasswordReset)
            .await
    }

    /// Verifies a password-reset code and replaces the user's password.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` on a bad code; `NotFound` if the code was
    /// valid but no account matches the destination (the caller has proved
    /// ownership at that point, so the distinction leaks nothing new).
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn reset_password(
        &self,
        destination: &Destination,
        code: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        if !self.otp.verify(destination.address(), code).await {
            return Err(AuthError::unauthenticated("invalid code"));
        }

        let Some(user) = self.users.find_by_destination(destination).await? else {
            return Err(AuthError::not_found("no account for destination"));
        };

        let new_hash = hash_password(new_password)?;
        self.users.update_password(&user.id, &new_hash).await?;

        info!(user_id = %user.id, "Password reset succeeded");
        Ok(())
    }

    async fn issue_and_dispatch(
        &self,
        destination: &Destination,
        purpose: OtpPurpose,
    ) -> AuthResult<()> {
        let code = self.otp.issue(destination.address()).await?;

        let dispatched = match destination {
            Destination::Email(addr) => self.mailer.send_code(addr, &code, purpose).await,
            Destination::Phone(number) => self.sms.send_code(number, &code).await,
        };

        if let Err(e) = dispatched {
            // The live code is useless if it never reached the user; drop
            // it so the window for a mis-delivered code is zero.
            self.otp.invalidate(destination.address()).await;
            debug!(error = %e, "One-time code dispatch failed");
            return Err(AuthError::DeliveryFailed);
        }

        info!(purpose = purpose.as_str(), "One-time code dispatched");
        Ok(())
    }
}
