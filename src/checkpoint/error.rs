//! Checkpoint error types.

use crate::builder::BuildError;
use crate::core::InvariantViolation;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpointed state breaks a ledger invariant
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(#[from] InvariantViolation),

    /// Event log and sequence disagree
    #[error("Checkpoint has {events} events but sequence {sequence}")]
    SequenceMismatch { events: usize, sequence: u64 },

    /// Capture attempted from inside the greeter's own withdrawal transfer
    #[error("Failed to capture greeter: {0}")]
    CaptureFailed(#[from] LedgerError),

    #[error("Failed to rebuild greeter: {0}")]
    Rebuild(#[from] BuildError),
}
