//! Precondition rules for ledger operations using Validation.

use crate::core::Wei;
use crate::enforcement::context::RuleContext;
use crate::ledger::LedgerError;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for validation check functions
pub type RuleCheck =
    Box<dyn Fn(&RuleContext<'_>) -> Validation<(), NonEmptyVec<LedgerError>> + Send + Sync>;

/// Preconditions gating one operation.
///
/// Every rule is evaluated against the committed state before anything
/// is mutated. `enforce` accumulates ALL violations; `check` reduces them
/// to the first one, which is what the entity reports.
pub struct OperationRules {
    pub(crate) required_payment: Option<Wei>,
    pub(crate) non_payable: bool,
    pub(crate) owner_only: bool,
    pub(crate) required_checks: Vec<RuleCheck>,
}

impl OperationRules {
    /// Enforce all rules, accumulating ALL violations.
    /// Returns Validation::Success(()) if all checks pass.
    pub fn enforce(&self, context: &RuleContext<'_>) -> Validation<(), NonEmptyVec<LedgerError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<LedgerError>>> = Vec::new();

        if self.owner_only {
            let check = if context.caller_is_owner() {
                Validation::success(())
            } else {
                Validation::fail(LedgerError::Unauthorized {
                    caller: context.call.caller.clone(),
                })
            };
            checks.push(check);
        }

        if let Some(expected) = self.required_payment {
            let received = context.call.value;
            let check = if received == expected {
                Validation::success(())
            } else {
                Validation::fail(LedgerError::InvalidPayment { expected, received })
            };
            checks.push(check);
        }

        if self.non_payable {
            let check = if context.call.is_paid() {
                Validation::fail(LedgerError::NonPayable {
                    value: context.call.value,
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(context));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Enforce all rules and report the first violation.
    pub fn check(&self, context: &RuleContext<'_>) -> Result<(), LedgerError> {
        match self.enforce(context) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => Err(errors
                .iter()
                .next()
                .cloned()
                .unwrap_or_else(|| LedgerError::Rejected("precondition failed".to_string()))),
        }
    }

    /// Number of configured rules, built-in and custom.
    pub fn len(&self) -> usize {
        usize::from(self.owner_only)
            + usize::from(self.required_payment.is_some())
            + usize::from(self.non_payable)
            + self.required_checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
