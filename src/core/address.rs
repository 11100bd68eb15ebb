//! Participant identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address-like token identifying a participant.
///
/// Addresses are opaque: the ledger only compares them for equality
/// (owner checks) and orders them (balance book keys). Surrounding
/// whitespace is trimmed and hex-style addresses are lowercased so that
/// `0xABC` and `0xabc` name the same participant.
///
/// # Example
///
/// ```rust
/// use greeter_ledger::core::Address;
///
/// let admin = Address::new("0xA11CE");
/// assert_eq!(admin, Address::new("0xa11ce"));
/// assert_eq!(admin.as_str(), "0xa11ce");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Create an address from any string-like token.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            Self(trimmed.to_ascii_lowercase())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Address {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}
