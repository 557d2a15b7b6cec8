//! # hearth-auth
//!
//! Authentication and session-revocation subsystem for Hearth services.
//!
//! This crate provides:
//! - RS256 JWT issuance and verification (access + refresh token pairs)
//! - Dual-tier revocation store (TTL cache primary, in-memory fallback)
//! - One-time-code challenges for login and password reset
//! - Argon2 password hashing
//! - Axum middleware gating protected operations
//!
//! ## Overview
//!
//! Every credential that can authenticate a request has a revocable
//! identifier: access tokens carry a session id (`sid`), refresh tokens a
//! token id (`jti`). Logout writes both identifiers to the revocation
//! store, and verification consults the store after signature and
//! lifetime checks. Revocation writes never fail the caller; when the
//! primary cache is unreachable the entry lands in a process-local
//! fallback so logout stays effective on this node.
//!
//! ## Modules
//!
//! - [`config`] - Issuer, signing-key, lifetime, and cache configuration
//! - [`token`] - JWT claims, signing keys, issuance, and verification
//! - [`revocation`] - Dual-tier revocation store
//! - [`otp`] - One-time-code challenge store
//! - [`service`] - The auth orchestrator (login, logout, OTP, password reset)
//! - [`middleware`] - Request interceptor and extractors
//! - [`http`] - Axum JSON handlers for the auth operations
//! - [`storage`] - Cache and user storage traits
//! - [`dispatch`] - Email/SMS delivery traits
//! - [`password`] - Argon2 hashing helpers

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod middleware;
pub mod otp;
pub mod password;
pub mod revocation;
pub mod service;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, CacheConfig, OtpConfig, SigningConfig, TokenLifetimes};
pub use dispatch::{ConsoleMailer, ConsoleSms, EmailSender, OtpPurpose, SmsSender};
pub use error::AuthError;
pub use http::{
    AccessTokenResponse, ApiState, LoginRequest, LogoutRequest, ResetPasswordRequest,
    SendOtpRequest, StatusResponse, VerifyOtpRequest, router,
};
pub use middleware::{AuthContext, AuthState, BearerAuth, OperationPolicy};
pub use otp::OtpStore;
pub use password::{hash_password, verify_password};
pub use revocation::{RevocationStore, TokenKind};
pub use service::AuthService;
pub use storage::{MemoryCache, TtlCache, UserRecord, UserStore};
pub use token::{
    AccessTokenClaims, JwtError, JwtService, RefreshTokenClaims, SigningKeyPair, TokenIssuer,
    TokenPair, TokenVerifier, VerifyError,
};
pub use types::Destination;

/// Type alias for auth results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use hearth_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::AuthConfig;
    pub use crate::error::AuthError;
    pub use crate::middleware::{AuthContext, AuthState, BearerAuth, OperationPolicy};
    pub use crate::revocation::{RevocationStore, TokenKind};
    pub use crate::service::AuthService;
    pub use crate::storage::{MemoryCache, TtlCache, UserRecord, UserStore};
    pub use crate::token::{
        JwtService, SigningKeyPair, TokenIssuer, TokenPair, TokenVerifier, VerifyError,
    };
    pub use crate::types::Destination;
}
