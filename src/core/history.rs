//! Append-only greeting history.
//!
//! Every value transition appends the value being *replaced*. Entries are
//! never removed or reordered once recorded.

use super::address::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A greeting that was replaced, with who replaced it and when.
///
/// # Example
///
/// ```rust
/// use greeter_ledger::core::{Address, GreetingRecord};
/// use chrono::Utc;
///
/// let record = GreetingRecord {
///     value: "hello".to_string(),
///     replaced_by: Some(Address::new("0xabc")),
///     replaced_at: Utc::now(),
/// };
/// assert_eq!(record.value, "hello");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GreetingRecord {
    /// The replaced value
    pub value: String,
    /// Participant whose update replaced it; `None` for the construction entry
    pub replaced_by: Option<Address>,
    /// When the replacement was committed
    pub replaced_at: DateTime<Utc>,
}

/// Ordered history of replaced greetings.
///
/// # Example
///
/// ```rust
/// use greeter_ledger::core::{GreetingHistory, GreetingRecord};
/// use chrono::Utc;
///
/// let mut history = GreetingHistory::new();
/// history.record(GreetingRecord {
///     value: String::new(),
///     replaced_by: None,
///     replaced_at: Utc::now(),
/// });
/// history.record(GreetingRecord {
///     value: "first".to_string(),
///     replaced_by: None,
///     replaced_at: Utc::now(),
/// });
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.value_at(1), Some("first"));
/// assert_eq!(history.values(), vec!["".to_string(), "first".to_string()]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GreetingHistory {
    records: Vec<GreetingRecord>,
}

impl GreetingHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record. O(1) amortized.
    pub fn record(&mut self, record: GreetingRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at `index`, if recorded.
    pub fn get(&self, index: usize) -> Option<&GreetingRecord> {
        self.records.get(index)
    }

    /// Replaced value at `index`, if recorded.
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(|r| r.value.as_str())
    }

    /// Copy of every replaced value, oldest first.
    pub fn values(&self) -> Vec<String> {
        self.records.iter().map(|r| r.value.clone()).collect()
    }

    /// All records in order.
    pub fn records(&self) -> &[GreetingRecord] {
        &self.records
    }

    /// Time between the first and last recorded replacement.
    ///
    /// Returns `None` for an empty history or when timestamps run
    /// backwards (replayed or restored records).
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.first()?, self.records.last()?);
        last.replaced_at
            .signed_duration_since(first.replaced_at)
            .to_std()
            .ok()
    }
}
