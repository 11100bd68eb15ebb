//! The greeter entity and its imperative shell.
//!
//! This module wraps the pure [`core`](crate::core) state in a lock,
//! gates every mutation with [`enforcement`](crate::enforcement) rules,
//! records emitted events, and moves funds out through a [`FundsChannel`]
//! supplied by the caller.
//!
//! # Key Concepts
//!
//! - **Greeter**: the entity; all operations take a [`CallContext`](crate::core::CallContext)
//! - **Receipts**: every committed mutation returns the events it emitted
//! - **Funds channel**: the only way value leaves the entity

mod error;
mod events;
mod funds;
mod greeter;

pub(crate) use greeter::{GreeterRules, Ledger};

pub use error::LedgerError;
pub use events::{LedgerEvent, Receipt};
pub use funds::{FundsChannel, InMemoryFunds, TransferError};
pub use greeter::Greeter;
