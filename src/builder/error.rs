//! Build errors for the greeter builder.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur when building a greeter.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Owner not specified. Call .owner(address) before .build()")]
    MissingOwner,

    #[error("Initial greeting not specified. Call .initial_greeting(text) before .build()")]
    MissingInitialGreeting,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
