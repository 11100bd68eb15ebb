//! Entity configuration.

use crate::core::{Wei, REQUIRED_PAYMENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a [`GreeterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("required_payment must be greater than zero")]
    ZeroPayment,
}

/// Tunables of a greeter entity.
///
/// Missing fields fall back to their defaults, so `{}` is a valid config.
///
/// # Example
///
/// ```rust
/// use greeter_ledger::config::GreeterConfig;
/// use greeter_ledger::core::REQUIRED_PAYMENT;
///
/// let config = GreeterConfig::from_json_str("{}").unwrap();
/// assert_eq!(config.required_payment, REQUIRED_PAYMENT);
///
/// let config = GreeterConfig::from_json_str(r#"{"required_payment": 5}"#).unwrap();
/// assert_eq!(config.required_payment, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreeterConfig {
    /// Exact value a paid update must carry, in wei. Rejections quote it
    /// in ether.
    pub required_payment: Wei,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            required_payment: REQUIRED_PAYMENT,
        }
    }
}

impl GreeterConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.required_payment == 0 {
            return Err(ConfigError::ZeroPayment);
        }
        Ok(())
    }
}
