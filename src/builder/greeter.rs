//! Builder for constructing greeter entities.

use crate::builder::error::BuildError;
use crate::config::GreeterConfig;
use crate::core::{Address, GreeterState, Wei};
use crate::enforcement::{Operation, RuleContext, RulesBuilder};
use crate::ledger::{Greeter, GreeterRules, Ledger};
use chrono::Utc;

/// Builder for constructing a [`Greeter`] with a fluent API.
pub struct GreeterBuilder {
    owner: Option<Address>,
    initial_greeting: Option<String>,
    config: GreeterConfig,
    set_greeting: RulesBuilder,
    set_greeting_payable: RulesBuilder,
    withdraw: RulesBuilder,
    restored: Option<Ledger>,
}

impl GreeterBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            owner: None,
            initial_greeting: None,
            config: GreeterConfig::default(),
            set_greeting: RulesBuilder::new(),
            set_greeting_payable: RulesBuilder::new(),
            withdraw: RulesBuilder::new(),
            restored: None,
        }
    }

    /// Set the owning participant (required).
    pub fn owner(mut self, owner: impl Into<Address>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Set the greeting installed at construction (required).
    pub fn initial_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.initial_greeting = Some(greeting.into());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: GreeterConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the exact payment paid updates must carry.
    pub fn required_payment(mut self, amount: Wei) -> Self {
        self.config.required_payment = amount;
        self
    }

    /// Add a custom precondition to one operation.
    /// Custom rules run after the operation's built-in rules.
    pub fn rule<F>(mut self, op: Operation, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        let slot = match op {
            Operation::SetGreeting => &mut self.set_greeting,
            Operation::SetGreetingPayable => &mut self.set_greeting_payable,
            Operation::Withdraw => &mut self.withdraw,
        };
        *slot = std::mem::take(slot).require_pred(predicate, message);
        self
    }

    /// Start from a restored ledger instead of a fresh one.
    /// Owner and initial greeting come from the restored state.
    pub(crate) fn restored(mut self, ledger: Ledger) -> Self {
        self.restored = Some(ledger);
        self
    }

    /// Build the greeter.
    /// Returns an error if required fields are missing or the config is invalid.
    pub fn build(self) -> Result<Greeter, BuildError> {
        self.config.validate()?;

        let ledger = match self.restored {
            Some(ledger) => ledger,
            None => {
                let owner = self.owner.ok_or(BuildError::MissingOwner)?;
                let greeting = self
                    .initial_greeting
                    .ok_or(BuildError::MissingInitialGreeting)?;
                Ledger::new(GreeterState::new(owner, greeting, Utc::now()))
            }
        };

        let rules = GreeterRules::assemble(
            self.set_greeting,
            self.set_greeting_payable,
            self.withdraw,
            self.config.required_payment,
        );

        Ok(Greeter::assemble(self.config, rules, ledger))
    }
}

impl Default for GreeterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
