//! Greeter ledger: a single-entity greeting ledger state machine
//!
//! The entity holds a current greeting, an append-only history of every
//! greeting it replaced, and a per-participant balance book funded by paid
//! updates. Only the owner can drain the held funds.
//!
//! The crate follows a "pure core, imperative shell" layout:
//!
//! - **core**: identities, amounts, history and the flat state record
//! - **enforcement**: preconditions checked before any mutation
//! - **ledger**: the locked entity, events, receipts and the funds seam
//! - **builder**, **config**, **checkpoint**: construction and persistence
//!
//! # Example
//!
//! ```rust
//! use greeter_ledger::core::{Address, CallContext, REQUIRED_PAYMENT};
//! use greeter_ledger::ledger::{Greeter, LedgerError};
//!
//! let admin = Address::new("0xa11ce");
//! let greeter = Greeter::new(admin.clone(), "hello blockchain!!!");
//!
//! greeter
//!     .set_greeting(&CallContext::new(admin), "second greeting msg")
//!     .unwrap();
//!
//! let underpaid = CallContext::new("0xb0b").with_value(REQUIRED_PAYMENT - 1);
//! let err = greeter.set_greeting_payable(&underpaid, "cheap").unwrap_err();
//! assert!(matches!(err, LedgerError::InvalidPayment { .. }));
//! assert_eq!(err.to_string(), "msg.value is not 0.1 ether");
//!
//! assert_eq!(
//!     greeter.greeting_history_all(),
//!     vec!["".to_string(), "hello blockchain!!!".to_string()]
//! );
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod enforcement;
pub mod ledger;

// Re-export commonly used types
pub use builder::GreeterBuilder;
pub use core::{Address, CallContext, Wei, REQUIRED_PAYMENT};
pub use ledger::{FundsChannel, Greeter, InMemoryFunds, LedgerError, LedgerEvent, Receipt};
