//! Token issuance and verification.
//!
//! - [`jwt`] - signing key handling and raw JWT encode/decode
//! - [`issuer`] - minting of access/refresh token pairs
//! - [`verifier`] - validation of presented tokens, including the
//!   revocation check

pub mod issuer;
pub mod jwt;
pub mod verifier;

pub use issuer::{TokenIssuer, TokenPair};
pub use jwt::{AccessTokenClaims, JwtError, JwtService, RefreshTokenClaims, SigningKeyPair};
pub use verifier::{TokenVerifier, VerifyError};
