//! Authentication error types.
//!
//! This module defines all error types that can occur during authentication
//! operations, along with their mapping to HTTP status codes at the
//! transport boundary.
//!
//! # Design
//!
//! Credential mismatch and unknown-user outcomes are both reported as
//! [`AuthError::Unauthenticated`] so that the login boundary never reveals
//! whether an account exists. `NotFound` is only used where the caller has
//! already proved ownership of the account (password reset after a valid
//! one-time code).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::token::VerifyError;

/// Errors that can occur during authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request lacks valid authentication credentials.
    ///
    /// Deliberately covers both "unknown user" and "wrong password" so the
    /// login boundary cannot be used for account enumeration.
    #[error("Unauthenticated: {message}")]
    Unauthenticated {
        /// Description of why the request is unauthenticated.
        message: String,
    },

    /// Bearer token verification failed with a distinguishable cause.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// The referenced resource does not exist.
    ///
    /// Only returned where the caller already proved ownership (e.g. a
    /// password reset after a valid one-time code).
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// The request is malformed or missing required parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// A one-time code could not be delivered.
    ///
    /// The message is intentionally generic and never names the delivery
    /// channel.
    #[error("Delivery failed")]
    DeliveryFailed,

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `Unauthenticated` error.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error means the caller is not authenticated.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. } | Self::Verify(_))
    }

    /// Returns `true` if this is a server-side error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::DeliveryFailed
                | Self::Storage { .. }
                | Self::Configuration { .. }
                | Self::Internal { .. }
        )
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated { .. } | Self::Verify(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::DeliveryFailed
            | Self::Storage { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable machine-readable error code.
    ///
    /// Verification failures keep their discriminant so clients can tell
    /// `expired` (prompt a refresh) apart from `revoked` or `bad_signature`
    /// (force a re-login).
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Verify(e) => e.error_code(),
            Self::NotFound { .. } => "not_found",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::DeliveryFailed => "delivery_failed",
            Self::Storage { .. } => "storage_error",
            Self::Configuration { .. } => "configuration_error",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side details stay in the logs, not in the response body.
        let message = if self.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Auth operation failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": self.error_code(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::unauthenticated("invalid credentials");
        assert_eq!(err.to_string(), "Unauthenticated: invalid credentials");

        let err = AuthError::not_found("unknown user");
        assert_eq!(err.to_string(), "Not found: unknown user");

        let err = AuthError::DeliveryFailed;
        assert_eq!(err.to_string(), "Delivery failed");
    }

    #[test]
    fn test_error_predicates() {
        assert!(AuthError::unauthenticated("x").is_authentication_error());
        assert!(AuthError::Verify(VerifyError::Revoked).is_authentication_error());
        assert!(!AuthError::storage("down").is_authentication_error());

        assert!(AuthError::storage("down").is_server_error());
        assert!(AuthError::DeliveryFailed.is_server_error());
        assert!(!AuthError::not_found("x").is_server_error());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::unauthenticated("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::Verify(VerifyError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::invalid_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes_distinguish_verify_failures() {
        assert_eq!(
            AuthError::Verify(VerifyError::Expired).error_code(),
            "expired"
        );
        assert_eq!(
            AuthError::Verify(VerifyError::Revoked).error_code(),
            "revoked"
        );
        assert_eq!(AuthError::unauthenticated("x").error_code(), "unauthenticated");
    }
}
