//! The entity's state record and its pure transitions.
//!
//! `GreeterState` is a flat record: there are no discrete modes. Every
//! method here is a plain in-memory transition with no I/O and no locking;
//! the `ledger` module decides *when* they run and under which lock.

use super::address::Address;
use super::amount::Wei;
use super::history::{GreetingHistory, GreetingRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A balance credit computed ahead of time and applied later.
///
/// Produced by [`GreeterState::plan_credit`] so that overflow is detected
/// before anything is mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credit {
    from: Address,
    amount: Wei,
    balance: Wei,
    total_held: Wei,
}

impl Credit {
    pub fn amount(&self) -> Wei {
        self.amount
    }
}

/// Broken accounting or history invariants.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("history is empty; construction must record the initial empty greeting")]
    EmptyHistory,

    #[error("history starts with {0:?} instead of the empty greeting")]
    MissingGenesisEntry(String),

    #[error("balances sum to {balances} but held + withdrawn is {accounted}")]
    AccountingMismatch { balances: Wei, accounted: Wei },

    #[error("accounting totals overflow")]
    Overflow,
}

/// Complete state of one greeter entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GreeterState {
    current: String,
    history: GreetingHistory,
    owner: Address,
    balances: BTreeMap<Address, Wei>,
    total_held: Wei,
    total_withdrawn: Wei,
}

impl GreeterState {
    /// Construct the entity: the implicit empty greeting is the first
    /// replaced value.
    pub fn new(owner: Address, initial: impl Into<String>, at: DateTime<Utc>) -> Self {
        let mut history = GreetingHistory::new();
        history.record(GreetingRecord {
            value: String::new(),
            replaced_by: None,
            replaced_at: at,
        });

        Self {
            current: initial.into(),
            history,
            owner,
            balances: BTreeMap::new(),
            total_held: 0,
            total_withdrawn: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn history(&self) -> &GreetingHistory {
        &self.history
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn is_owner(&self, who: &Address) -> bool {
        self.owner == *who
    }

    /// Cumulative payments from `who`; zero if they never paid.
    pub fn balance_of(&self, who: &Address) -> Wei {
        self.balances.get(who).copied().unwrap_or(0)
    }

    pub fn balances(&self) -> &BTreeMap<Address, Wei> {
        &self.balances
    }

    pub fn total_held(&self) -> Wei {
        self.total_held
    }

    pub fn total_withdrawn(&self) -> Wei {
        self.total_withdrawn
    }

    /// Record the current greeting in history and install `new`.
    /// Returns the replaced greeting.
    pub fn replace_greeting(
        &mut self,
        by: &Address,
        new: impl Into<String>,
        at: DateTime<Utc>,
    ) -> String {
        let old = std::mem::replace(&mut self.current, new.into());
        self.history.record(GreetingRecord {
            value: old.clone(),
            replaced_by: Some(by.clone()),
            replaced_at: at,
        });
        old
    }

    /// Compute the effect of crediting `amount` from `from` without
    /// applying it. `None` if any counter would overflow.
    pub fn plan_credit(&self, from: &Address, amount: Wei) -> Option<Credit> {
        let balance = self.balance_of(from).checked_add(amount)?;
        let total_held = self.total_held.checked_add(amount)?;
        // Keep lifetime receipts representable so withdrawals can never overflow.
        self.lifetime_received()?.checked_add(amount)?;

        Some(Credit {
            from: from.clone(),
            amount,
            balance,
            total_held,
        })
    }

    pub fn apply_credit(&mut self, credit: Credit) {
        self.balances.insert(credit.from, credit.balance);
        self.total_held = credit.total_held;
    }

    /// Record a settled payout of `amount` from the held pool.
    ///
    /// Only called once the external transfer has succeeded. Balances
    /// are untouched.
    pub fn record_withdrawal(&mut self, amount: Wei) {
        self.total_held = self.total_held.saturating_sub(amount);
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);
    }

    /// Everything ever received: held or paid out.
    fn lifetime_received(&self) -> Option<Wei> {
        self.total_held.checked_add(self.total_withdrawn)
    }

    /// Verify history shape and `sum(balances) == held + withdrawn`.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let genesis = self.history.get(0).ok_or(InvariantViolation::EmptyHistory)?;
        if !genesis.value.is_empty() {
            return Err(InvariantViolation::MissingGenesisEntry(
                genesis.value.clone(),
            ));
        }

        let balances = self
            .balances
            .values()
            .try_fold(0u128, |acc, b| acc.checked_add(*b))
            .ok_or(InvariantViolation::Overflow)?;
        let accounted = self
            .lifetime_received()
            .ok_or(InvariantViolation::Overflow)?;

        if balances != accounted {
            return Err(InvariantViolation::AccountingMismatch {
                balances,
                accounted,
            });
        }
        Ok(())
    }
}
