//! One-time-code delivery collaborators.
//!
//! Email and SMS delivery are external services; this module defines the
//! seams the orchestrator calls plus console implementations that log the
//! code instead of sending it, for development and tests.
//!
//! Delivery is best-effort: a failure surfaces to callers as a generic
//! delivery failure, never as a channel-specific error code.

use async_trait::async_trait;

use crate::AuthResult;

/// Why a one-time code was issued. Changes the message wording only; the
/// challenge store does not distinguish purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    /// Primary or secondary login challenge.
    Login,
    /// Password-reset challenge.
    PasswordReset,
}

impl OtpPurpose {
    /// Returns the purpose as a short label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// Email delivery collaborator.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends a one-time code to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; the orchestrator maps this to a
    /// generic failure.
    async fn send_code(&self, to: &str, code: &str, purpose: OtpPurpose) -> AuthResult<()>;
}

/// SMS delivery collaborator.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Sends a one-time code to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; the orchestrator maps this to a
    /// generic failure.
    async fn send_code(&self, to: &str, code: &str) -> AuthResult<()>;
}

/// Email sender that logs instead of sending. Development and tests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

impl ConsoleMailer {
    /// Creates a new console mailer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailSender for ConsoleMailer {
    async fn send_code(&self, to: &str, code: &str, purpose: OtpPurpose) -> AuthResult<()> {
        tracing::info!(
            to = %to,
            code = %code,
            purpose = purpose.as_str(),
            "One-time code email (development mode)"
        );
        Ok(())
    }
}

/// SMS sender that logs instead of sending. Development and tests only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSms;

impl ConsoleSms {
    /// Creates a new console SMS sender.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SmsSender for ConsoleSms {
    async fn send_code(&self, to: &str, code: &str) -> AuthResult<()> {
        tracing::info!(
            to = %to,
            code = %code,
            "One-time code SMS (development mode)"
        );
        Ok(())
    }
}
