use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

/// Represents a financial account with a signed running balance.
///
/// The balance is only ever mutated through the balance reconciler or the
/// transfer coordinator; credit-card purchases never touch it directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub balance: Money,
    /// At most one default account may exist in a store.
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_true")]
    pub include_in_total: bool,
    /// Optimistic-concurrency token; bumped on every balance write.
    #[serde(default)]
    pub version: u64,
}

fn default_true() -> bool {
    true
}

impl Account {
    /// Creates a new account with a zero balance.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            balance: Money::ZERO,
            is_default: false,
            include_in_total: true,
            version: 0,
        }
    }

    pub fn with_opening_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}
