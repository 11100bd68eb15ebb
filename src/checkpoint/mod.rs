//! Checkpoint and resume functionality for greeter entities.
//!
//! A checkpoint captures state, event log and commit sequence from a single
//! commit, so a greeter can survive a process restart. Custom rules are
//! code, not data: resume through a [`GreeterBuilder`] to re-attach them.

use crate::builder::GreeterBuilder;
use crate::config::GreeterConfig;
use crate::core::GreeterState;
use crate::ledger::{Greeter, Ledger, LedgerEvent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of a greeter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    pub config: GreeterConfig,

    pub state: GreeterState,

    /// Every event emitted before the checkpoint
    pub events: Vec<LedgerEvent>,

    /// Number of committed operations
    pub sequence: u64,
}

impl Checkpoint {
    /// Capture a greeter as of its latest commit.
    ///
    /// Blocks while another thread's mutation is in flight. Fails when
    /// called from inside the greeter's own withdrawal transfer, since
    /// that withdrawal has not committed yet.
    pub fn capture(greeter: &Greeter) -> Result<Self, CheckpointError> {
        let ledger = greeter.capture()?;
        Ok(Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            config: greeter.config().clone(),
            state: ledger.state,
            events: ledger.events,
            sequence: ledger.sequence,
        })
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        serde_json::from_str(json).map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))
    }

    /// Check version, invariants and event/sequence consistency.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        self.state.check_invariants()?;

        // Every commit emits at least one event.
        if (self.events.len() as u64) < self.sequence
            || (self.sequence == 0 && !self.events.is_empty())
        {
            return Err(CheckpointError::SequenceMismatch {
                events: self.events.len(),
                sequence: self.sequence,
            });
        }
        Ok(())
    }

    /// Rebuild a greeter with no custom rules.
    pub fn resume(self) -> Result<Greeter, CheckpointError> {
        self.resume_with(GreeterBuilder::new())
    }

    /// Rebuild a greeter through `builder`, keeping its custom rules.
    /// The configuration always comes from the checkpoint.
    pub fn resume_with(self, builder: GreeterBuilder) -> Result<Greeter, CheckpointError> {
        self.validate()?;
        debug!(id = %self.id, sequence = self.sequence, "resuming from checkpoint");

        let ledger = Ledger {
            state: self.state,
            events: self.events,
            sequence: self.sequence,
        };
        Ok(builder.config(self.config).restored(ledger).build()?)
    }
}
