//! The caller context every operation is evaluated against.

use super::address::Address;
use super::amount::Wei;
use chrono::{DateTime, Utc};

/// Who is calling, what value they attached, and when.
///
/// Supplied by the surrounding harness for every operation. Access
/// control and accounting are evaluated against this context only.
#[derive(Clone, Debug, PartialEq)]
pub struct CallContext {
    pub caller: Address,
    pub value: Wei,
    pub received_at: DateTime<Utc>,
}

impl CallContext {
    /// A call from `caller` with no value attached.
    pub fn new(caller: impl Into<Address>) -> Self {
        Self {
            caller: caller.into(),
            value: 0,
            received_at: Utc::now(),
        }
    }

    /// Attach a payment to the call.
    pub fn with_value(mut self, value: Wei) -> Self {
        self.value = value;
        self
    }

    /// Override the receive time (replays and tests).
    pub fn at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn is_paid(&self) -> bool {
        self.value > 0
    }
}
