//! Context provided to precondition checks.

use crate::core::{CallContext, GreeterState};

/// Everything a precondition may inspect: the call and the committed
/// state it would apply to.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub call: &'a CallContext,
    pub state: &'a GreeterState,
}

impl<'a> RuleContext<'a> {
    pub fn new(call: &'a CallContext, state: &'a GreeterState) -> Self {
        Self { call, state }
    }

    /// True when the caller owns the entity (pure)
    pub fn caller_is_owner(&self) -> bool {
        self.state.is_owner(&self.call.caller)
    }
}
