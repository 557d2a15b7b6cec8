//! Shared auth types.

use serde::{Deserialize, Serialize};

/// A destination for one-time codes, tagged at the API boundary.
///
/// The delivery channel is part of the type rather than being sniffed from
/// the string shape, so malformed inputs are rejected where they enter the
/// system instead of silently picking a channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "channel", content = "address", rename_all = "snake_case")]
pub enum Destination {
    /// An email address.
    Email(String),
    /// A phone number in E.164 or local form.
    Phone(String),
}

impl Destination {
    /// Returns the raw address, used verbatim as the challenge lookup key.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::Email(addr) | Self::Phone(addr) => addr,
        }
    }

    /// Returns the channel name for logging.
    #[must_use]
    pub fn channel(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Phone(_) => "sms",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.channel(), self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_serde_is_tagged() {
        let dest = Destination::Email("a@x.com".to_string());
        let json = serde_json::to_string(&dest).unwrap();
        assert_eq!(json, r#"{"channel":"email","address":"a@x.com"}"#);

        let parsed: Destination =
            serde_json::from_str(r#"{"channel":"phone","address":"5551234"}"#).unwrap();
        assert_eq!(parsed, Destination::Phone("5551234".to_string()));
    }

    #[test]
    fn test_address_and_channel() {
        let dest = Destination::Phone("5551234".to_string());
        assert_eq!(dest.address(), "5551234");
        assert_eq!(dest.channel(), "sms");
        assert_eq!(dest.to_string(), "sms:5551234");
    }
}
