//! Builder API for creating operation rules.

use crate::core::Wei;
use crate::enforcement::context::RuleContext;
use crate::enforcement::rules::{OperationRules, RuleCheck};
use crate::ledger::LedgerError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating operation rules
pub struct RulesBuilder {
    required_payment: Option<Wei>,
    non_payable: bool,
    owner_only: bool,
    required_checks: Vec<RuleCheck>,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self {
            required_payment: None,
            non_payable: false,
            owner_only: false,
            required_checks: Vec::new(),
        }
    }

    /// Attached value must equal `amount` exactly
    pub fn require_payment(mut self, amount: Wei) -> Self {
        self.required_payment = Some(amount);
        self
    }

    /// Attached value must be zero
    pub fn non_payable(mut self) -> Self {
        self.non_payable = true;
        self
    }

    /// Caller must be the owner
    pub fn owner_only(mut self) -> Self {
        self.owner_only = true;
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Validation<(), NonEmptyVec<LedgerError>> + Send + Sync + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add an already boxed check
    pub fn require_boxed(mut self, check: RuleCheck) -> Self {
        self.required_checks.push(check);
        self
    }

    /// Add a simple predicate check; `message` becomes the revert reason
    pub fn require_pred<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        let message = message.into();
        let check = move |ctx: &RuleContext<'_>| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(LedgerError::Rejected(message.clone()))
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    /// Build the rules
    pub fn build(self) -> OperationRules {
        OperationRules {
            required_payment: self.required_payment,
            non_payable: self.non_payable,
            owner_only: self.owner_only,
            required_checks: self.required_checks,
        }
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
