//! Errors raised by ledger operations.

use crate::core::{format_units, Address, Unit, Wei};
use thiserror::Error;

/// Every way a ledger operation can be rejected.
///
/// A rejected operation has no effect: no history entry, no balance
/// change, no event. The display text of each variant is the revert
/// reason the harness observes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    /// Paid update carried something other than the required payment.
    /// With the default payment this reads "msg.value is not 0.1 ether".
    #[error("msg.value is not {} ether", in_ether(.expected))]
    InvalidPayment { expected: Wei, received: Wei },

    /// Withdrawal attempted by someone other than the owner.
    #[error("only owner")]
    Unauthorized { caller: Address },

    #[error("history index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Value attached to an operation that does not accept payment.
    #[error("non-payable operation received {value} wei")]
    NonPayable { value: Wei },

    /// A funds channel called back into a mutating operation while its
    /// own withdrawal transfer was still running.
    #[error("reentrant call during withdrawal transfer")]
    ReentrantCall,

    #[error("transfer of {amount} wei to {recipient} failed: {reason}")]
    TransferFailed {
        recipient: Address,
        amount: Wei,
        reason: String,
    },

    #[error("balance arithmetic overflow")]
    BalanceOverflow,

    #[error("{0}")]
    Rejected(String),
}

fn in_ether(amount: &Wei) -> String {
    format_units(*amount, Unit::Ether)
}

impl LedgerError {
    /// The revert string the harness matches against.
    pub fn revert_reason(&self) -> String {
        self.to_string()
    }
}
