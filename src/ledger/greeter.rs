//! The greeter entity: serialized mutations over a shared state record.

use crate::config::GreeterConfig;
use crate::core::{Address, CallContext, GreeterState, InvariantViolation, Wei};
use crate::enforcement::{Operation, OperationRules, RuleContext, RulesBuilder};
use crate::ledger::error::LedgerError;
use crate::ledger::events::{LedgerEvent, Receipt};
use crate::ledger::funds::FundsChannel;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::cell::Cell;
use tracing::{debug, info, warn};

/// Preconditions for each mutating operation.
pub(crate) struct GreeterRules {
    pub(crate) set_greeting: OperationRules,
    pub(crate) set_greeting_payable: OperationRules,
    pub(crate) withdraw: OperationRules,
}

impl GreeterRules {
    /// Combine custom checks with each operation's built-in rules.
    pub(crate) fn assemble(
        set_greeting: RulesBuilder,
        set_greeting_payable: RulesBuilder,
        withdraw: RulesBuilder,
        required_payment: Wei,
    ) -> Self {
        Self {
            set_greeting: Operation::SetGreeting
                .with_defaults(set_greeting, required_payment)
                .build(),
            set_greeting_payable: Operation::SetGreetingPayable
                .with_defaults(set_greeting_payable, required_payment)
                .build(),
            withdraw: Operation::Withdraw
                .with_defaults(withdraw, required_payment)
                .build(),
        }
    }

    fn for_operation(&self, op: Operation) -> &OperationRules {
        match op {
            Operation::SetGreeting => &self.set_greeting,
            Operation::SetGreetingPayable => &self.set_greeting_payable,
            Operation::Withdraw => &self.withdraw,
        }
    }
}

/// State plus the event log, guarded together so that every reader sees
/// events and state from the same commit.
#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    pub(crate) state: GreeterState,
    pub(crate) events: Vec<LedgerEvent>,
    pub(crate) sequence: u64,
}

impl Ledger {
    pub(crate) fn new(state: GreeterState) -> Self {
        Self {
            state,
            events: Vec::new(),
            sequence: 0,
        }
    }

    fn replace_greeting(&mut self, ctx: &CallContext, greeting: String) -> LedgerEvent {
        let old = self
            .state
            .replace_greeting(&ctx.caller, greeting.clone(), ctx.received_at);
        LedgerEvent::SetGreeting {
            sender: ctx.caller.clone(),
            old_greeting: old,
            new_greeting: greeting,
        }
    }

    fn commit(&mut self, events: Vec<LedgerEvent>) -> Receipt {
        self.sequence += 1;
        self.events.extend(events.iter().cloned());
        Receipt {
            sequence: self.sequence,
            events,
        }
    }
}

/// A single greeting ledger entity.
///
/// Mutations run one at a time behind the mutation gate. Each evaluates
/// every precondition against the committed state and only then applies
/// its effects under the write lock, so a rejected call leaves no trace.
/// A withdrawal holds the gate across its transfer and publishes nothing
/// until the transfer succeeds. Reads take the read lock and see one commit.
///
/// # Example
///
/// ```rust
/// use greeter_ledger::core::{Address, CallContext, REQUIRED_PAYMENT};
/// use greeter_ledger::ledger::{Greeter, InMemoryFunds};
///
/// let admin = Address::new("0xa11ce");
/// let greeter = Greeter::new(admin.clone(), "hello blockchain!!!");
///
/// greeter
///     .set_greeting(&CallContext::new(admin.clone()), "second greeting msg")
///     .unwrap();
/// assert_eq!(greeter.greet(), "second greeting msg");
/// assert_eq!(greeter.greeting_history_count(), 2);
///
/// let payer = CallContext::new("0xb0b").with_value(REQUIRED_PAYMENT);
/// greeter.set_greeting_payable(&payer, "paid").unwrap();
///
/// let funds = InMemoryFunds::new();
/// let receiver = Address::new("0xfeed");
/// greeter
///     .withdraw(&CallContext::new(admin), &receiver, &funds)
///     .unwrap();
/// assert_eq!(funds.balance_of(&receiver), REQUIRED_PAYMENT);
/// assert_eq!(greeter.total_held(), 0);
/// ```
pub struct Greeter {
    config: GreeterConfig,
    rules: GreeterRules,
    /// Serializes mutations. The flag is set while a withdrawal transfer
    /// runs on the thread holding the gate.
    gate: ReentrantMutex<Cell<bool>>,
    ledger: RwLock<Ledger>,
}

impl Greeter {
    /// Construct with the default configuration and no extra rules.
    pub fn new(owner: impl Into<Address>, initial_greeting: impl Into<String>) -> Self {
        let config = GreeterConfig::default();
        let rules = GreeterRules::assemble(
            RulesBuilder::new(),
            RulesBuilder::new(),
            RulesBuilder::new(),
            config.required_payment,
        );
        let state = GreeterState::new(owner.into(), initial_greeting, chrono::Utc::now());
        Self::assemble(config, rules, Ledger::new(state))
    }

    pub(crate) fn assemble(config: GreeterConfig, rules: GreeterRules, ledger: Ledger) -> Self {
        info!(
            owner = %ledger.state.owner(),
            greeting = %ledger.state.current(),
            required_payment = config.required_payment,
            "greeter constructed"
        );
        Self {
            config,
            rules,
            gate: ReentrantMutex::new(Cell::new(false)),
            ledger: RwLock::new(ledger),
        }
    }

    pub fn config(&self) -> &GreeterConfig {
        &self.config
    }

    /// Take the mutation gate, waiting for other threads' mutations.
    /// Fails only for a call made from inside this entity's own transfer.
    fn enter(&self) -> Result<ReentrantMutexGuard<'_, Cell<bool>>, LedgerError> {
        let gate = self.gate.lock();
        if gate.get() {
            warn!("reentrant call during withdrawal transfer rejected");
            return Err(LedgerError::ReentrantCall);
        }
        Ok(gate)
    }

    fn enforce(
        &self,
        op: Operation,
        ctx: &CallContext,
        state: &GreeterState,
    ) -> Result<(), LedgerError> {
        self.rules
            .for_operation(op)
            .check(&RuleContext::new(ctx, state))
            .map_err(|err| {
                warn!(operation = ?op, caller = %ctx.caller, value = ctx.value, error = %err, "operation rejected");
                err
            })
    }

    /// Replace the greeting. Open to every caller; rejects attached value.
    pub fn set_greeting(
        &self,
        ctx: &CallContext,
        greeting: impl Into<String>,
    ) -> Result<Receipt, LedgerError> {
        let greeting = greeting.into();
        let _gate = self.enter()?;
        let mut ledger = self.ledger.write();
        self.enforce(Operation::SetGreeting, ctx, &ledger.state)?;

        let changed = ledger.replace_greeting(ctx, greeting);
        let receipt = ledger.commit(vec![changed]);
        info!(sequence = receipt.sequence, caller = %ctx.caller, "greeting updated");
        Ok(receipt)
    }

    /// Replace the greeting while paying exactly the required payment.
    ///
    /// The payment is credited to the caller's balance and retained in
    /// the held pool until the owner withdraws it.
    pub fn set_greeting_payable(
        &self,
        ctx: &CallContext,
        greeting: impl Into<String>,
    ) -> Result<Receipt, LedgerError> {
        let greeting = greeting.into();
        let _gate = self.enter()?;
        let mut ledger = self.ledger.write();
        self.enforce(Operation::SetGreetingPayable, ctx, &ledger.state)?;

        let credit = ledger
            .state
            .plan_credit(&ctx.caller, ctx.value)
            .ok_or_else(|| {
                warn!(caller = %ctx.caller, value = ctx.value, "paid update would overflow balances");
                LedgerError::BalanceOverflow
            })?;

        let changed = ledger.replace_greeting(ctx, greeting);
        let amount = credit.amount();
        ledger.state.apply_credit(credit);
        let paid = LedgerEvent::PaymentReceived {
            from: ctx.caller.clone(),
            amount,
        };
        let receipt = ledger.commit(vec![changed, paid]);
        info!(
            sequence = receipt.sequence,
            caller = %ctx.caller,
            amount,
            total_held = ledger.state.total_held(),
            "paid greeting update"
        );
        Ok(receipt)
    }

    /// Pay the whole held pool to `recipient`. Owner only.
    ///
    /// The mutation gate is held across the transfer, so concurrent
    /// withdrawals and updates queue behind it and the pool cannot change
    /// underneath. The reset is committed only after `funds` succeeds; a
    /// failed (or panicking) transfer leaves the entity untouched. A
    /// recipient calling back into a mutating operation from inside the
    /// transfer gets [`LedgerError::ReentrantCall`]. Per-participant
    /// balances are never touched.
    pub fn withdraw<F>(
        &self,
        ctx: &CallContext,
        recipient: &Address,
        funds: &F,
    ) -> Result<Receipt, LedgerError>
    where
        F: FundsChannel + ?Sized,
    {
        let gate = self.enter()?;
        let amount = {
            let ledger = self.ledger.read();
            self.enforce(Operation::Withdraw, ctx, &ledger.state)?;
            ledger.state.total_held()
        };

        let transferred = {
            let _in_transfer = TransferFlag::raise(&gate);
            funds.transfer(recipient, amount)
        };

        if let Err(err) = transferred {
            warn!(recipient = %recipient, amount, error = %err, "withdrawal transfer failed");
            return Err(LedgerError::TransferFailed {
                recipient: recipient.clone(),
                amount,
                reason: err.to_string(),
            });
        }

        let mut ledger = self.ledger.write();
        ledger.state.record_withdrawal(amount);
        let receipt = ledger.commit(vec![LedgerEvent::Withdrawn {
            to: recipient.clone(),
            amount,
        }]);
        info!(sequence = receipt.sequence, recipient = %recipient, amount, "withdrawal settled");
        Ok(receipt)
    }

    /// Current greeting.
    pub fn greet(&self) -> String {
        self.ledger.read().state.current().to_string()
    }

    /// Number of replaced greetings, construction's entry included.
    pub fn greeting_history_count(&self) -> usize {
        self.ledger.read().state.history().len()
    }

    /// Every replaced greeting, oldest first.
    pub fn greeting_history_all(&self) -> Vec<String> {
        self.ledger.read().state.history().values()
    }

    /// Replaced greeting at `index`.
    pub fn greeting_history_one(&self, index: usize) -> Result<String, LedgerError> {
        let ledger = self.ledger.read();
        let history = ledger.state.history();
        history
            .value_at(index)
            .map(str::to_string)
            .ok_or(LedgerError::IndexOutOfRange {
                index,
                len: history.len(),
            })
    }

    /// Cumulative payments from `who`; zero if they never paid.
    pub fn balances(&self, who: &Address) -> Wei {
        self.ledger.read().state.balance_of(who)
    }

    pub fn owner(&self) -> Address {
        self.ledger.read().state.owner().clone()
    }

    /// Funds retained and not yet withdrawn.
    pub fn total_held(&self) -> Wei {
        self.ledger.read().state.total_held()
    }

    pub fn total_withdrawn(&self) -> Wei {
        self.ledger.read().state.total_withdrawn()
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> GreeterState {
        self.ledger.read().state.clone()
    }

    /// Every event emitted so far, in commit order.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.ledger.read().events.clone()
    }

    /// Number of committed operations.
    pub fn sequence(&self) -> u64 {
        self.ledger.read().sequence
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.ledger.read().state.check_invariants()
    }

    /// State, events and sequence from one commit.
    ///
    /// Waits for any in-flight mutation, withdrawals included, so the
    /// capture never straddles a transfer.
    pub(crate) fn capture(&self) -> Result<Ledger, LedgerError> {
        let _gate = self.enter()?;
        let ledger = self.ledger.read();
        debug!(sequence = ledger.sequence, "capturing ledger");
        Ok(ledger.clone())
    }
}

/// Marks a withdrawal transfer as running; cleared on drop, panics included.
struct TransferFlag<'a>(&'a Cell<bool>);

impl<'a> TransferFlag<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for TransferFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::REQUIRED_PAYMENT;
    use crate::ledger::funds::{InMemoryFunds, TransferError};

    const INIT: &str = "hello blockchain!!!";

    fn admin() -> Address {
        Address::new("0xad")
    }

    fn greeter() -> Greeter {
        Greeter::new(admin(), INIT)
    }

    fn paid(from: &str) -> CallContext {
        CallContext::new(from).with_value(REQUIRED_PAYMENT)
    }

    struct RejectingFunds;

    impl FundsChannel for RejectingFunds {
        fn transfer(&self, to: &Address, _amount: Wei) -> Result<(), TransferError> {
            Err(TransferError::Rejected(to.clone()))
        }
    }

    #[test]
    fn construction_records_empty_genesis() {
        let greeter = greeter();
        assert_eq!(greeter.greet(), INIT);
        assert_eq!(greeter.greeting_history_count(), 1);
        assert_eq!(greeter.greeting_history_one(0).unwrap(), "");
        assert_eq!(greeter.owner(), admin());
        assert_eq!(greeter.sequence(), 0);
        assert!(greeter.events().is_empty());
    }

    #[test]
    fn set_greeting_emits_change_event() {
        let greeter = greeter();
        let receipt = greeter
            .set_greeting(&CallContext::new(admin()), "second greeting msg")
            .unwrap();

        assert_eq!(receipt.sequence, 1);
        assert_eq!(
            receipt.greeting_changed(),
            Some(&LedgerEvent::SetGreeting {
                sender: admin(),
                old_greeting: INIT.to_string(),
                new_greeting: "second greeting msg".to_string(),
            })
        );
        assert_eq!(greeter.events(), receipt.events);
    }

    #[test]
    fn set_greeting_rejects_attached_value() {
        let greeter = greeter();
        let err = greeter
            .set_greeting(&CallContext::new(admin()).with_value(1), "x")
            .unwrap_err();

        assert_eq!(err, LedgerError::NonPayable { value: 1 });
        assert_eq!(greeter.greet(), INIT);
        assert_eq!(greeter.greeting_history_count(), 1);
    }

    #[test]
    fn wrong_payment_changes_nothing() {
        let greeter = greeter();
        let before = greeter.snapshot();

        for value in [0, REQUIRED_PAYMENT - 1, REQUIRED_PAYMENT + 1] {
            let ctx = CallContext::new("0xb0b").with_value(value);
            let err = greeter.set_greeting_payable(&ctx, "nope").unwrap_err();
            assert_eq!(err.revert_reason(), "msg.value is not 0.1 ether");
        }

        assert_eq!(greeter.snapshot(), before);
        assert!(greeter.events().is_empty());
        assert_eq!(greeter.sequence(), 0);
    }

    #[test]
    fn paid_update_credits_caller() {
        let greeter = greeter();
        let receipt = greeter.set_greeting_payable(&paid("0xb0b"), "paid").unwrap();

        assert_eq!(receipt.events.len(), 2);
        assert_eq!(
            receipt.events[1],
            LedgerEvent::PaymentReceived {
                from: Address::new("0xb0b"),
                amount: REQUIRED_PAYMENT,
            }
        );
        assert_eq!(greeter.greet(), "paid");
        assert_eq!(greeter.balances(&Address::new("0xb0b")), REQUIRED_PAYMENT);
        assert_eq!(greeter.total_held(), REQUIRED_PAYMENT);
        assert_eq!(greeter.greeting_history_all(), vec!["", INIT]);
    }

    #[test]
    fn non_owner_cannot_withdraw() {
        let greeter = greeter();
        greeter.set_greeting_payable(&paid("0xb0b"), "paid").unwrap();
        let funds = InMemoryFunds::new();

        let err = greeter
            .withdraw(&CallContext::new("0xb0b"), &Address::new("0xfeed"), &funds)
            .unwrap_err();

        assert_eq!(err.revert_reason(), "only owner");
        assert_eq!(greeter.total_held(), REQUIRED_PAYMENT);
        assert_eq!(funds.total(), 0);
    }

    #[test]
    fn failed_transfer_leaves_pool_intact() {
        let greeter = greeter();
        greeter.set_greeting_payable(&paid("0xb0b"), "paid").unwrap();
        let before = greeter.snapshot();

        let err = greeter
            .withdraw(&CallContext::new(admin()), &Address::new("0xfeed"), &RejectingFunds)
            .unwrap_err();

        assert!(matches!(
            err,
            LedgerError::TransferFailed { amount, .. } if amount == REQUIRED_PAYMENT
        ));
        assert_eq!(greeter.snapshot(), before);
        assert_eq!(greeter.events().len(), 2);
        assert!(greeter.check_invariants().is_ok());
    }

    #[test]
    fn reentrant_recipient_cannot_double_spend() {
        struct Reentrant<'a> {
            greeter: &'a Greeter,
            book: InMemoryFunds,
            observed: parking_lot::Mutex<Vec<Result<Receipt, LedgerError>>>,
        }

        impl FundsChannel for Reentrant<'_> {
            fn transfer(&self, to: &Address, amount: Wei) -> Result<(), TransferError> {
                let again = self.greeter.withdraw(
                    &CallContext::new(Address::new("0xad")),
                    to,
                    &self.book,
                );
                self.observed.lock().push(again);
                let update = self
                    .greeter
                    .set_greeting_payable(&paid("0xd0d"), "sneaky");
                self.observed.lock().push(update);
                self.book.transfer(to, amount)
            }
        }

        let greeter = greeter();
        greeter.set_greeting_payable(&paid("0xb0b"), "a").unwrap();
        greeter.set_greeting_payable(&paid("0xc0c"), "b").unwrap();

        let channel = Reentrant {
            greeter: &greeter,
            book: InMemoryFunds::new(),
            observed: parking_lot::Mutex::new(Vec::new()),
        };
        let recipient = Address::new("0xfeed");
        greeter
            .withdraw(&CallContext::new(admin()), &recipient, &channel)
            .unwrap();

        let observed = channel.observed.lock();
        assert_eq!(observed.len(), 2);
        assert_eq!(observed[0], Err(LedgerError::ReentrantCall));
        assert_eq!(observed[1], Err(LedgerError::ReentrantCall));
        drop(observed);
        assert_eq!(channel.book.balance_of(&recipient), 2 * REQUIRED_PAYMENT);
        assert_eq!(greeter.greet(), "b");
        assert_eq!(greeter.total_held(), 0);
        assert_eq!(greeter.total_withdrawn(), 2 * REQUIRED_PAYMENT);
        assert!(greeter.check_invariants().is_ok());

        // The gate is released once the withdrawal returns.
        greeter.set_greeting_payable(&paid("0xd0d"), "after").unwrap();
        assert_eq!(greeter.total_held(), REQUIRED_PAYMENT);
    }

    #[test]
    fn reads_during_transfer_see_last_commit() {
        struct Observer<'a> {
            greeter: &'a Greeter,
            seen: parking_lot::Mutex<Option<GreeterState>>,
        }

        impl FundsChannel for Observer<'_> {
            fn transfer(&self, _to: &Address, _amount: Wei) -> Result<(), TransferError> {
                *self.seen.lock() = Some(self.greeter.snapshot());
                Ok(())
            }
        }

        let greeter = greeter();
        greeter.set_greeting_payable(&paid("0xb0b"), "a").unwrap();
        let before = greeter.snapshot();
        let observer = Observer {
            greeter: &greeter,
            seen: parking_lot::Mutex::new(None),
        };
        greeter
            .withdraw(&CallContext::new(admin()), &Address::new("0xfeed"), &observer)
            .unwrap();

        assert_eq!(observer.seen.lock().clone(), Some(before));
        assert_eq!(greeter.total_held(), 0);
    }

    #[test]
    fn failing_transfer_never_publishes_reset() {
        struct PeekThenReject<'a> {
            greeter: &'a Greeter,
            held: parking_lot::Mutex<Option<Wei>>,
        }

        impl FundsChannel for PeekThenReject<'_> {
            fn transfer(&self, to: &Address, _amount: Wei) -> Result<(), TransferError> {
                *self.held.lock() = Some(self.greeter.total_held());
                Err(TransferError::Rejected(to.clone()))
            }
        }

        let greeter = greeter();
        greeter.set_greeting_payable(&paid("0xb0b"), "a").unwrap();
        let channel = PeekThenReject {
            greeter: &greeter,
            held: parking_lot::Mutex::new(None),
        };

        let err = greeter
            .withdraw(&CallContext::new(admin()), &Address::new("0xfeed"), &channel)
            .unwrap_err();

        assert!(matches!(err, LedgerError::TransferFailed { .. }));
        assert_eq!(*channel.held.lock(), Some(REQUIRED_PAYMENT));
        assert_eq!(greeter.total_held(), REQUIRED_PAYMENT);
        assert_eq!(greeter.sequence(), 1);
    }

    #[test]
    fn panicking_transfer_leaves_pool_intact() {
        struct Panics;

        impl FundsChannel for Panics {
            fn transfer(&self, _to: &Address, _amount: Wei) -> Result<(), TransferError> {
                panic!("channel exploded");
            }
        }

        let greeter = greeter();
        greeter.set_greeting_payable(&paid("0xb0b"), "a").unwrap();
        let before = greeter.snapshot();

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            greeter.withdraw(&CallContext::new(admin()), &Address::new("0xfeed"), &Panics)
        }));

        assert!(outcome.is_err());
        assert_eq!(greeter.snapshot(), before);

        // Neither the gate nor the transfer flag outlive the panic.
        let funds = InMemoryFunds::new();
        greeter
            .withdraw(&CallContext::new(admin()), &Address::new("0xfeed"), &funds)
            .unwrap();
        assert_eq!(funds.total(), REQUIRED_PAYMENT);
    }

    #[test]
    fn empty_pool_withdrawal_transfers_zero() {
        let greeter = greeter();
        let funds = InMemoryFunds::new();
        let receipt = greeter
            .withdraw(&CallContext::new(admin()), &Address::new("0xfeed"), &funds)
            .unwrap();

        assert_eq!(
            receipt.events,
            vec![LedgerEvent::Withdrawn {
                to: Address::new("0xfeed"),
                amount: 0
            }]
        );
        assert_eq!(funds.total(), 0);
    }

    #[test]
    fn history_lookup_is_bounds_checked() {
        let greeter = greeter();
        assert_eq!(
            greeter.greeting_history_one(1),
            Err(LedgerError::IndexOutOfRange { index: 1, len: 1 })
        );
    }
}
