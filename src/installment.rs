//! Expansion of installment credit-card purchases.
//!
//! One purchase intent becomes one transaction per consecutive month, each
//! attached to the bill its date resolves into. Every card purchase, even a
//! single-installment one, gets a series id so later edits can replace the
//! whole series atomically from the caller's point of view.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::billing::{add_months, BillingService};
use crate::domain::{Transaction, TransactionStatus};
use crate::errors::{LedgerError, Result};
use crate::money::{Direction, Money};
use crate::store::LedgerStore;

/// User input describing a card purchase before expansion.
#[derive(Debug, Clone)]
pub struct InstallmentPlan {
    pub description: String,
    /// Unsigned total purchase value; split evenly across installments.
    pub total_amount: Money,
    pub start_date: NaiveDate,
    pub installments: u32,
    pub category_id: Option<Uuid>,
}

pub struct InstallmentExpander<'a, S: LedgerStore> {
    store: &'a S,
    billing: BillingService<'a, S>,
}

impl<'a, S: LedgerStore> InstallmentExpander<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            billing: BillingService::new(store),
        }
    }

    /// Expands a purchase into its dated series of pending transactions.
    ///
    /// Installment `i` is dated `start_date + i` months (day clamped in
    /// short months) and attached to whichever bill that date resolves
    /// into. Each installment carries the same magnitude, `total /
    /// installments` in cents truncated toward zero; no remainder
    /// distribution. Card purchases stay pending until the bill is paid,
    /// so every row is created with [`TransactionStatus::Pending`].
    ///
    /// The rows are returned, not inserted; the ledger decides when they
    /// hit the store.
    pub fn expand(&self, plan: &InstallmentPlan, card_id: Uuid) -> Result<Vec<Transaction>> {
        validate(plan)?;
        let series_id = Uuid::new_v4();
        let per_installment =
            Money::from_cents(plan.total_amount.cents().abs() / i64::from(plan.installments));

        let mut series = Vec::with_capacity(plan.installments as usize);
        for index in 0..plan.installments {
            let installment_date = add_months(plan.start_date, index as i32);
            let bill = self.billing.get_or_create_bill(card_id, installment_date)?;
            series.push(Transaction {
                id: Uuid::new_v4(),
                amount: Direction::Expense.signed(per_installment),
                date: installment_date,
                status: TransactionStatus::Pending,
                account_id: None,
                credit_card_bill_id: Some(bill.id),
                category_id: plan.category_id,
                transfer_id: None,
                series_id: Some(series_id),
                installment_number: index + 1,
                total_installments: plan.installments,
                description: plan.description.clone(),
            });
        }
        tracing::info!(
            series = %series_id,
            installments = plan.installments,
            total = %plan.total_amount,
            "expanded installment purchase"
        );
        Ok(series)
    }

    /// Replaces an existing series with a fresh expansion of `plan`.
    ///
    /// Keyed strictly by the series id: the old rows are deleted by id and
    /// the new expansion inserted, so two purchases that happen to share a
    /// description on the same bill can never collide.
    pub fn replace_series(
        &self,
        series_id: Uuid,
        plan: &InstallmentPlan,
        card_id: Uuid,
    ) -> Result<Vec<Transaction>> {
        let existing = self.store.by_series(series_id)?;
        if existing.is_empty() {
            return Err(LedgerError::Validation(format!(
                "installment series {} does not exist",
                series_id
            )));
        }
        let replacement = self.expand(plan, card_id)?;
        let removed = self.store.delete_series(series_id)?;
        self.store.insert_transactions(&replacement)?;
        tracing::info!(
            old_series = %series_id,
            removed,
            inserted = replacement.len(),
            "re-expanded installment purchase"
        );
        Ok(replacement)
    }
}

fn validate(plan: &InstallmentPlan) -> Result<()> {
    if plan.installments < 1 {
        return Err(LedgerError::Validation(
            "installment count must be at least 1".into(),
        ));
    }
    if !plan.total_amount.abs().is_positive() {
        return Err(LedgerError::Validation(
            "purchase amount must be positive".into(),
        ));
    }
    Ok(())
}
