//! JWT signing and decoding.
//!
//! Tokens are RS256-signed JWTs. The auth service is the single issuer and
//! holds the only private key; verifying callers need the public half only.
//!
//! # Example
//!
//! ```ignore
//! use hearth_auth::token::jwt::{JwtService, SigningKeyPair};
//!
//! // Generate a new key pair (or load one with `SigningKeyPair::from_pem`)
//! let key_pair = SigningKeyPair::generate_rsa("hearth-auth-1")?;
//!
//! let jwt = JwtService::new(key_pair, "https://auth.hearth.app", "https://api.hearth.app");
//! let token = jwt.encode(&claims)?;
//! let data = jwt.decode::<AccessTokenClaims>(&token)?;
//! ```

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token is not valid yet (`nbf` in the future).
    #[error("Token not yet valid")]
    NotYetValid,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims do not match this issuer/audience.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },

    /// Failed to generate a cryptographic key.
    #[error("Key generation error: {message}")]
    KeyGenerationError {
        /// Description of the key generation error.
        message: String,
    },

    /// Invalid key format or data.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Creates a new `KeyGenerationError`.
    #[must_use]
    pub fn key_generation_error(message: impl Into<String>) -> Self {
        Self::KeyGenerationError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a key-related error (a startup
    /// precondition failure, not a per-request error).
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::KeyGenerationError { .. } | Self::InvalidKey { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                Self::invalid_key(err.to_string())
            }
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Access token claims.
///
/// Immutable once signed; never persisted, since existence is implicit in the
/// signature. The `sid` claim is the unit of revocation for this class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Issuer (auth service URL).
    pub iss: String,

    /// Subject (user id).
    pub sub: String,

    /// Audience (API gateway URL).
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Not valid before (Unix timestamp).
    pub nbf: i64,

    /// User email.
    pub email: String,

    /// User role.
    pub role: String,

    /// Session id, random and unique per login.
    pub sid: String,
}

impl AccessTokenClaims {
    /// Creates claims for a fresh session.
    ///
    /// A new random `sid` is generated; issuing a token never invalidates
    /// any prior token for the same user.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        subject: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        lifetime: time::Duration,
    ) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            aud: audience.into(),
            exp: now + lifetime.whole_seconds(),
            iat: now,
            nbf: now,
            email: email.into(),
            role: role.into(),
            sid: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Refresh token claims.
///
/// The `jti` claim is the unit of revocation for this class, independent of
/// any session id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshTokenClaims {
    /// Issuer (auth service URL).
    pub iss: String,

    /// Subject (user id).
    pub sub: String,

    /// Audience (API gateway URL).
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// User email.
    pub email: String,

    /// Refresh id, random and unique per issuance.
    pub jti: String,
}

impl RefreshTokenClaims {
    /// Creates claims with a fresh random `jti`.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        subject: impl Into<String>,
        email: impl Into<String>,
        lifetime: time::Duration,
    ) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            aud: audience.into(),
            exp: now + lifetime.whole_seconds(),
            iat: now,
            email: email.into(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

// ============================================================================
// Signing Key Pair
// ============================================================================

/// An RS256 signing key pair for JWT operations.
#[derive(Clone)]
pub struct SigningKeyPair {
    /// Key ID, placed in the JWT header.
    pub kid: String,

    /// Encoding key (private key) for signing.
    encoding_key: EncodingKey,

    /// Decoding key (public key) for verification.
    decoding_key: DecodingKey,

    /// When the key was created or loaded.
    pub created_at: OffsetDateTime,
}

impl SigningKeyPair {
    /// Generates a new 2048-bit RSA key pair.
    ///
    /// Intended for development and tests; production deployments load a
    /// provisioned key with [`SigningKeyPair::from_pem`].
    ///
    /// # Errors
    /// Returns an error if key generation fails.
    pub fn generate_rsa(kid: impl Into<String>) -> Result<Self, JwtError> {
        let bits = 2048;
        let private_key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;

        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| JwtError::key_generation_error(e.to_string()))?;

        Ok(Self {
            kid: kid.into(),
            encoding_key,
            decoding_key,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    /// Loads a key pair from PEM strings.
    ///
    /// # Arguments
    /// * `kid` - Key ID
    /// * `private_pem` - PEM-encoded PKCS#8 RSA private key
    /// * `public_pem` - PEM-encoded RSA public key
    ///
    /// # Errors
    /// Returns an error if the PEM data is invalid.
    pub fn from_pem(
        kid: impl Into<String>,
        private_pem: &str,
        public_pem: &str,
    ) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
            .map_err(|e| JwtError::invalid_key(e.to_string()))?;

        Ok(Self {
            kid: kid.into(),
            encoding_key,
            decoding_key,
            created_at: OffsetDateTime::now_utc(),
        })
    }

    /// Loads a key pair from PEM files on disk.
    ///
    /// # Errors
    /// Returns an error if either file cannot be read or parsed.
    pub fn from_pem_files(
        kid: impl Into<String>,
        private_key_path: &std::path::Path,
        public_key_path: &std::path::Path,
    ) -> Result<Self, JwtError> {
        let private_pem = std::fs::read_to_string(private_key_path).map_err(|e| {
            JwtError::invalid_key(format!("read {}: {e}", private_key_path.display()))
        })?;
        let public_pem = std::fs::read_to_string(public_key_path).map_err(|e| {
            JwtError::invalid_key(format!("read {}: {e}", public_key_path.display()))
        })?;
        Self::from_pem(kid, &private_pem, &public_pem)
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// Service for encoding and decoding JWT tokens.
///
/// Thread-safe (`Send + Sync`) and intended to be shared behind an `Arc`.
pub struct JwtService {
    signing_key: SigningKeyPair,
    issuer: String,
    audience: String,
}

impl JwtService {
    /// Creates a new JWT service.
    ///
    /// # Arguments
    /// * `signing_key` - The key pair to use for signing/verification
    /// * `issuer` - The expected `iss` claim value
    /// * `audience` - The expected `aud` claim value
    #[must_use]
    pub fn new(
        signing_key: SigningKeyPair,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            signing_key,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Encodes claims into a JWT string.
    ///
    /// # Errors
    /// Returns an error if encoding fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.signing_key.kid.clone());

        encode(&header, claims, &self.signing_key.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and validates a JWT string.
    ///
    /// Validates signature, `exp`, `nbf` (when present), `iss` and `aud`.
    ///
    /// # Errors
    /// Returns an error if decoding or validation fails.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, JwtError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        decode(token, &self.signing_key.decoding_key, &validation).map_err(JwtError::from)
    }

    /// Returns the current signing key ID.
    #[must_use]
    pub fn kid(&self) -> &str {
        &self.signing_key.kid
    }

    /// Returns the issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the audience URL.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> JwtService {
        let key = SigningKeyPair::generate_rsa("test-key").expect("keygen");
        JwtService::new(key, "https://auth.test", "https://api.test")
    }

    #[test]
    fn test_encode_decode_access_claims() {
        let jwt = test_service();
        let claims = AccessTokenClaims::new(
            "https://auth.test",
            "https://api.test",
            "user-1",
            "a@x.com",
            "member",
            time::Duration::hours(3),
        );

        let token = jwt.encode(&claims).expect("encode");
        let decoded = jwt.decode::<AccessTokenClaims>(&token).expect("decode");
        assert_eq!(decoded.claims, claims);
        assert_eq!(decoded.header.kid.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_fresh_sessions_get_distinct_ids() {
        let a = AccessTokenClaims::new(
            "i",
            "a",
            "u",
            "e@x.com",
            "member",
            time::Duration::minutes(1),
        );
        let b = AccessTokenClaims::new(
            "i",
            "a",
            "u",
            "e@x.com",
            "member",
            time::Duration::minutes(1),
        );
        assert_ne!(a.sid, b.sid);

        let r1 = RefreshTokenClaims::new("i", "a", "u", "e@x.com", time::Duration::days(7));
        let r2 = RefreshTokenClaims::new("i", "a", "u", "e@x.com", time::Duration::days(7));
        assert_ne!(r1.jti, r2.jti);
    }

    #[test]
    fn test_decode_rejects_wrong_issuer() {
        let jwt = test_service();
        let claims = AccessTokenClaims::new(
            "https://rogue.test",
            "https://api.test",
            "user-1",
            "a@x.com",
            "member",
            time::Duration::hours(1),
        );
        let token = jwt.encode(&claims).expect("encode");

        match jwt.decode::<AccessTokenClaims>(&token) {
            Err(JwtError::InvalidClaims { .. }) => {}
            other => panic!("expected InvalidClaims, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_foreign_signature() {
        let jwt = test_service();
        let foreign = test_service();
        let claims = AccessTokenClaims::new(
            "https://auth.test",
            "https://api.test",
            "user-1",
            "a@x.com",
            "member",
            time::Duration::hours(1),
        );
        let token = foreign.encode(&claims).expect("encode");

        match jwt.decode::<AccessTokenClaims>(&token) {
            Err(JwtError::InvalidSignature) => {}
            other => panic!("expected InvalidSignature, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let jwt = test_service();
        assert!(matches!(
            jwt.decode::<AccessTokenClaims>("not-a-token"),
            Err(JwtError::DecodingError { .. })
        ));
    }
}
