use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::money::Money;

/// Credit-card configuration: which day of the month a billing cycle closes
/// and which day the resulting bill is due.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditCard {
    pub id: Uuid,
    pub name: String,
    pub closing_day: u32,
    pub due_day: u32,
}

impl CreditCard {
    /// Creates a card configuration, validating both days up front so the
    /// cycle resolver never has to handle out-of-range values at runtime.
    pub fn new(name: impl Into<String>, closing_day: u32, due_day: u32) -> Result<Self> {
        for (label, day) in [("closing day", closing_day), ("due day", due_day)] {
            if !(1..=31).contains(&day) {
                return Err(LedgerError::Validation(format!(
                    "{} must be between 1 and 31, got {}",
                    label, day
                )));
            }
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            closing_day,
            due_day,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BillStatus {
    #[default]
    Open,
    Closed,
    Paid,
}

/// One monthly bill instance of a card, keyed by `(credit_card_id,
/// reference_month)`. Created lazily on the first purchase that maps into
/// the cycle and never deleted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreditCardBill {
    pub id: Uuid,
    pub credit_card_id: Uuid,
    /// First day of the cycle's nominal month; the natural key.
    pub reference_month: NaiveDate,
    pub closing_date: NaiveDate,
    pub due_date: NaiveDate,
    /// Aggregated by an external process, never written here.
    pub total_amount: Money,
    pub paid_amount: Money,
    pub status: BillStatus,
}
