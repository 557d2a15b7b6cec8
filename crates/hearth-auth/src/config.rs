//! Authentication configuration.
//!
//! All durations use humantime syntax in configuration files
//! (`"180m"`, `"7d"`, `"300s"`).
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! issuer = "https://auth.hearth.app"
//! audience = "https://api.hearth.app"
//!
//! [auth.tokens]
//! access_lifetime = "3h"
//! refresh_lifetime = "7d"
//!
//! [auth.cache]
//! url = "redis://127.0.0.1:6379"
//! command_timeout = "2s"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Issuer URL (used in the token `iss` claim and verified on decode).
    pub issuer: String,

    /// Audience URL (used in the token `aud` claim and verified on decode).
    pub audience: String,

    /// Token signing configuration.
    pub signing: SigningConfig,

    /// Token lifetime configuration.
    pub tokens: TokenLifetimes,

    /// One-time passcode configuration.
    pub otp: OtpConfig,

    /// Shared cache (primary revocation/OTP tier) configuration.
    pub cache: CacheConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "https://auth.hearth.app".to_string(),
            audience: "https://api.hearth.app".to_string(),
            signing: SigningConfig::default(),
            tokens: TokenLifetimes::default(),
            otp: OtpConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Token signing key configuration.
///
/// The private key is a startup precondition: if it cannot be loaded the
/// process cannot serve auth at all, so key errors surface at construction
/// time rather than per request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SigningConfig {
    /// Path to the PEM-encoded RSA private key (PKCS#8).
    pub private_key_path: PathBuf,

    /// Path to the PEM-encoded RSA public key.
    pub public_key_path: PathBuf,

    /// Key ID placed in the JWT header.
    pub kid: String,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            private_key_path: PathBuf::from("keys/auth.pem"),
            public_key_path: PathBuf::from("keys/auth.pub.pem"),
            kid: "hearth-auth-1".to_string(),
        }
    }
}

/// Token lifetime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenLifetimes {
    /// Access token lifetime.
    /// Also caps the TTL of session revocation records.
    #[serde(with = "humantime_serde")]
    pub access_lifetime: Duration,

    /// Refresh token lifetime.
    /// Also caps the TTL of refresh-id revocation records.
    #[serde(with = "humantime_serde")]
    pub refresh_lifetime: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_lifetime: Duration::from_secs(180 * 60), // 3 hours
            refresh_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
        }
    }
}

/// One-time passcode configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OtpConfig {
    /// How long an issued code stays valid.
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(300), // 5 minutes
        }
    }
}

/// Shared cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Connection URL for the primary TTL cache.
    pub url: String,

    /// Per-command timeout. An unresponsive cache must not stall the auth
    /// path; commands that exceed this degrade to the in-process fallback.
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            command_timeout: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.tokens.access_lifetime, Duration::from_secs(10800));
        assert_eq!(
            config.tokens.refresh_lifetime,
            Duration::from_secs(604_800)
        );
        assert_eq!(config.otp.lifetime, Duration::from_secs(300));
        assert_eq!(config.cache.command_timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_humantime_durations() {
        let toml = r#"
            issuer = "https://auth.example.com"

            [tokens]
            access_lifetime = "30m"
            refresh_lifetime = "14d"

            [otp]
            lifetime = "120s"
        "#;
        let config: AuthConfig = toml::from_str(toml).expect("valid config");
        assert_eq!(config.issuer, "https://auth.example.com");
        assert_eq!(config.tokens.access_lifetime, Duration::from_secs(1800));
        assert_eq!(
            config.tokens.refresh_lifetime,
            Duration::from_secs(14 * 24 * 3600)
        );
        assert_eq!(config.otp.lifetime, Duration::from_secs(120));
        // Unspecified sections fall back to defaults.
        assert_eq!(config.audience, "https://api.hearth.app");
    }
}
