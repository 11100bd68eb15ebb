//! Core ledger types and pure state transitions.
//!
//! This module contains the pure core of the greeter entity:
//! - Participant identities and currency amounts
//! - The caller context operations are evaluated against
//! - Append-only greeting history
//! - The flat state record and its transitions
//!
//! Nothing in this module locks, logs, or talks to the outside world.

mod address;
mod amount;
mod context;
mod history;
mod state;

pub use address::Address;
pub use amount::{
    format_units, parse_units, AmountError, Unit, Wei, REQUIRED_PAYMENT, WEI_PER_ETHER,
};
pub use context::CallContext;
pub use history::{GreetingHistory, GreetingRecord};
pub use state::{Credit, GreeterState, InvariantViolation};
