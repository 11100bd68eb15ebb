//! Events emitted by committed operations and the receipts carrying them.

use crate::core::{Address, Wei};
use serde::{Deserialize, Serialize};

/// An event emitted by a successful mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    /// The greeting changed (emitted by both update operations)
    SetGreeting {
        sender: Address,
        old_greeting: String,
        new_greeting: String,
    },
    PaymentReceived {
        from: Address,
        amount: Wei,
    },
    Withdrawn {
        to: Address,
        amount: Wei,
    },
}

impl LedgerEvent {
    /// Name the harness filters events by.
    pub fn name(&self) -> &str {
        match self {
            Self::SetGreeting { .. } => "SetGreeting",
            Self::PaymentReceived { .. } => "PaymentReceived",
            Self::Withdrawn { .. } => "Withdrawn",
        }
    }
}

/// Outcome of a committed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Position of the operation in the entity's commit order
    pub sequence: u64,
    pub events: Vec<LedgerEvent>,
}

impl Receipt {
    /// Events with the given name, in emission order.
    pub fn events_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LedgerEvent> + 'a {
        self.events.iter().filter(move |e| e.name() == name)
    }

    /// First `SetGreeting` event, if the operation changed the greeting.
    pub fn greeting_changed(&self) -> Option<&LedgerEvent> {
        self.events_named("SetGreeting").next()
    }
}
