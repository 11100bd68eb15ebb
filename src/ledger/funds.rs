//! The value-transfer seam between the entity and its harness.

use crate::core::{Address, Wei};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use thiserror::Error;

/// Why an external transfer did not happen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransferError {
    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),

    #[error("recipient {recipient} balance would overflow")]
    Overflow { recipient: Address },

    #[error("transfer channel unavailable: {0}")]
    Unavailable(String),
}

/// Moves value out of the entity to an external participant.
///
/// Implementations must either move the whole amount or return an error
/// having moved nothing. They may call back into the entity.
pub trait FundsChannel {
    fn transfer(&self, to: &Address, amount: Wei) -> Result<(), TransferError>;
}

impl<T: FundsChannel + ?Sized> FundsChannel for &T {
    fn transfer(&self, to: &Address, amount: Wei) -> Result<(), TransferError> {
        (**self).transfer(to, amount)
    }
}

/// In-memory external balance book.
///
/// Stands in for the network's account balances: withdrawals credit the
/// recipient here so callers can observe the payout.
#[derive(Debug, Default)]
pub struct InMemoryFunds {
    balances: Mutex<BTreeMap<Address, Wei>>,
}

impl InMemoryFunds {
    pub fn new() -> Self {
        Self::default()
    }

    /// External balance of `who`.
    pub fn balance_of(&self, who: &Address) -> Wei {
        self.balances.lock().get(who).copied().unwrap_or(0)
    }

    /// Sum of every external balance.
    pub fn total(&self) -> Wei {
        self.balances.lock().values().copied().fold(0, Wei::saturating_add)
    }
}

impl FundsChannel for InMemoryFunds {
    fn transfer(&self, to: &Address, amount: Wei) -> Result<(), TransferError> {
        let mut balances = self.balances.lock();
        let current = balances.get(to).copied().unwrap_or(0);
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| TransferError::Overflow {
                recipient: to.clone(),
            })?;
        balances.insert(to.clone(), updated);
        Ok(())
    }
}
