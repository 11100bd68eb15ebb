//! Validation-based precondition enforcement for ledger operations.
//!
//! Every mutating operation is gated by an [`OperationRules`] value that is
//! evaluated against the caller context and the committed state *before*
//! any mutation happens. Checks use Stillwater's `Validation` type so that
//! all violations can be collected in one pass; the entity itself reports
//! the first violation as its typed error.
//!
//! # Example
//!
//! ```rust
//! use greeter_ledger::core::{Address, CallContext, GreeterState, REQUIRED_PAYMENT};
//! use greeter_ledger::enforcement::{RuleContext, RulesBuilder};
//! use chrono::Utc;
//!
//! let rules = RulesBuilder::new().require_payment(REQUIRED_PAYMENT).build();
//! let state = GreeterState::new(Address::new("0xa11ce"), "hi", Utc::now());
//! let call = CallContext::new("0xb0b").with_value(REQUIRED_PAYMENT);
//!
//! assert!(rules.check(&RuleContext::new(&call, &state)).is_ok());
//! ```

pub mod builder;
pub mod context;
pub mod rules;

use crate::core::Wei;

pub use builder::RulesBuilder;
pub use context::RuleContext;
pub use rules::{OperationRules, RuleCheck};

/// The mutating operations rules can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    SetGreeting,
    SetGreetingPayable,
    Withdraw,
}

impl Operation {
    /// Add the built-in preconditions of this operation to `rules`.
    pub fn with_defaults(self, rules: RulesBuilder, required_payment: Wei) -> RulesBuilder {
        match self {
            Self::SetGreeting => rules.non_payable(),
            Self::SetGreetingPayable => rules.require_payment(required_payment),
            Self::Withdraw => rules.owner_only().non_payable(),
        }
    }

    /// Built-in preconditions of this operation alone.
    pub fn default_rules(self, required_payment: Wei) -> RulesBuilder {
        self.with_defaults(RulesBuilder::new(), required_payment)
    }
}
