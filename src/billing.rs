//! Billing-cycle resolution for credit-card purchases.
//!
//! Maps a purchase date plus a card's closing/due-day configuration to the
//! bill the purchase belongs to, creating that bill on first use.

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::domain::{BillStatus, CreditCardBill};
use crate::errors::{LedgerError, Result};
use crate::money::Money;
use crate::store::{LedgerStore, StoreError};

/// The resolved cycle a purchase falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingCycle {
    /// First day of the closing date's month; the bill's natural key.
    pub reference_month: NaiveDate,
    pub closing_date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Maps a purchase date to its billing cycle.
///
/// A purchase made after the configured closing day rolls into the next
/// month's cycle; a purchase on the closing day itself still belongs to the
/// current cycle. The due date is anchored to the closing date's month and
/// only moves to the following month when the configured due day would land
/// before the close.
pub fn resolve_cycle(purchase_date: NaiveDate, closing_day: u32, due_day: u32) -> BillingCycle {
    let rolls_forward = purchase_date.day() > closing_day;
    let closing_month = add_months(first_of_month(purchase_date), i32::from(rolls_forward));
    let closing_date = clamped_date(closing_month.year(), closing_month.month(), closing_day);

    let mut due_date = clamped_date(closing_month.year(), closing_month.month(), due_day);
    if due_date < closing_date {
        let next = add_months(closing_month, 1);
        due_date = clamped_date(next.year(), next.month(), due_day);
    }

    BillingCycle {
        reference_month: closing_month,
        closing_date,
        due_date,
    }
}

/// Calendar month addition with day-of-month clamping (Jan 31 + 1 month is
/// Feb 28/29).
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + months;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    clamped_date(year, month as u32, date.day())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    clamped_date(date.year(), date.month(), 1)
}

fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default())
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    match NaiveDate::from_ymd_opt(next_year, next_month, 1) {
        Some(first_next) => (first_next - Duration::days(1)).day(),
        None => 28,
    }
}

/// Idempotent bill lookup and creation on top of a store.
pub struct BillingService<'a, S: LedgerStore> {
    store: &'a S,
}

impl<'a, S: LedgerStore> BillingService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Returns the bill the purchase belongs to, creating it when absent.
    ///
    /// A duplicate-key rejection from the store means another writer created
    /// the bill between our lookup and insert; the row is re-fetched and
    /// used as-is rather than treated as a failure.
    pub fn get_or_create_bill(
        &self,
        card_id: Uuid,
        purchase_date: NaiveDate,
    ) -> Result<CreditCardBill> {
        let card = self.store.card(card_id)?;
        let cycle = resolve_cycle(purchase_date, card.closing_day, card.due_day);

        if let Some(existing) = self.store.find_bill(card_id, cycle.reference_month)? {
            return Ok(existing);
        }

        let bill = CreditCardBill {
            id: Uuid::new_v4(),
            credit_card_id: card_id,
            reference_month: cycle.reference_month,
            closing_date: cycle.closing_date,
            due_date: cycle.due_date,
            total_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            status: BillStatus::Open,
        };
        match self.store.insert_bill(bill) {
            Ok(created) => {
                tracing::info!(
                    card = %card_id,
                    month = %cycle.reference_month.format("%Y-%m"),
                    "created credit-card bill"
                );
                Ok(created)
            }
            Err(StoreError::Duplicate(_)) => {
                tracing::warn!(
                    card = %card_id,
                    month = %cycle.reference_month.format("%Y-%m"),
                    "lost bill-creation race, reusing existing bill"
                );
                self.store
                    .find_bill(card_id, cycle.reference_month)?
                    .ok_or_else(|| {
                        LedgerError::Integrity(format!(
                            "bill for card {} in {} reported duplicate but cannot be fetched",
                            card_id,
                            cycle.reference_month.format("%Y-%m")
                        ))
                    })
            }
            Err(err) => Err(err.into()),
        }
    }
}
