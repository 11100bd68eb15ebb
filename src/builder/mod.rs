//! Builder API for ergonomic greeter construction.
//!
//! # Example
//!
//! ```
//! use greeter_ledger::builder::GreeterBuilder;
//! use greeter_ledger::core::CallContext;
//! use greeter_ledger::enforcement::Operation;
//!
//! let greeter = GreeterBuilder::new()
//!     .owner("0xa11ce")
//!     .initial_greeting("hello blockchain!!!")
//!     .rule(
//!         Operation::SetGreeting,
//!         |ctx| ctx.state.history().len() < 100,
//!         "history is full",
//!     )
//!     .build()
//!     .unwrap();
//!
//! greeter
//!     .set_greeting(&CallContext::new("0xb0b"), "hi")
//!     .unwrap();
//! assert_eq!(greeter.greeting_history_count(), 2);
//! ```

pub mod error;
pub mod greeter;

pub use error::BuildError;
pub use greeter::GreeterBuilder;
