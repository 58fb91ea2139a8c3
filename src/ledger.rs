//! The transaction ledger: entry point composing billing, installment,
//! balance, and transfer services into the flows a UI drives.
//!
//! Every operation is a sequence of independent store calls with no
//! cross-call atomicity; validation happens before the first write and
//! later failures surface to the caller without rollback.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::balance::BalanceReconciler;
use crate::billing::BillingService;
use crate::domain::{Transaction, TransactionKind, TransactionStatus};
use crate::errors::{LedgerError, Result};
use crate::installment::{InstallmentExpander, InstallmentPlan};
use crate::money::{Direction, Money};
use crate::store::LedgerStore;
use crate::transfer::{TransferCoordinator, TransferPair};

/// User input for a plain income/expense transaction.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub account_id: Uuid,
    pub direction: Direction,
    /// Unsigned magnitude; the sign comes from `direction`.
    pub amount: Money,
    pub date: NaiveDate,
    pub status: TransactionStatus,
    pub category_id: Option<Uuid>,
    pub description: String,
}

pub struct TransactionLedger<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> TransactionLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records a plain income or expense against an account.
    pub fn add_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        validate_draft(&draft)?;
        let transaction = Transaction::new(
            draft.account_id,
            draft.direction,
            draft.amount,
            draft.date,
            draft.description,
        )
        .with_status(draft.status)
        .with_category(draft.category_id);

        self.store.insert_transaction(transaction.clone())?;
        self.reconciler().apply_create(&transaction)?;
        tracing::info!(transaction = %transaction.id, "recorded transaction");
        Ok(transaction)
    }

    /// Records a credit-card purchase, expanding installments when asked.
    ///
    /// The resulting rows never touch an account balance; their value is
    /// aggregated into the bills they land on by an external process. A
    /// non-installment purchase is the one-element degenerate series.
    pub fn add_card_purchase(
        &self,
        card_id: Uuid,
        plan: &InstallmentPlan,
    ) -> Result<Vec<Transaction>> {
        let series = self.expander().expand(plan, card_id)?;
        self.store.insert_transactions(&series)?;
        Ok(series)
    }

    /// Applies an edit to a plain transaction: reverse the old state's
    /// balance effect, apply the new one, then persist the updated row.
    ///
    /// Edits may not change a transaction's kind; turning a plain
    /// transaction into a card purchase or a transfer leg fails fast
    /// instead of attempting a partial transformation.
    pub fn edit_transaction(&self, id: Uuid, draft: TransactionDraft) -> Result<Transaction> {
        validate_draft(&draft)?;
        let old = self.store.transaction(id)?;
        if old.kind() != TransactionKind::Plain {
            return Err(LedgerError::Validation(format!(
                "transaction {} is not a plain transaction; edit it through its own flow",
                id
            )));
        }

        let mut new = old.clone();
        new.account_id = Some(draft.account_id);
        new.amount = draft.direction.signed(draft.amount);
        new.date = draft.date;
        new.status = draft.status;
        new.category_id = draft.category_id;
        new.description = draft.description;

        self.reconciler().apply_edit(&old, &new)?;
        self.store.update_transaction(new.clone())?;
        tracing::info!(transaction = %id, "edited transaction");
        Ok(new)
    }

    /// Re-expands an installment purchase under its new terms, replacing
    /// the whole series keyed by its id.
    pub fn edit_card_purchase(
        &self,
        series_id: Uuid,
        card_id: Uuid,
        plan: &InstallmentPlan,
    ) -> Result<Vec<Transaction>> {
        self.expander().replace_series(series_id, plan, card_id)
    }

    /// Deletes a transaction, reversing any balance effect first.
    ///
    /// A transfer leg routes through transfer cancellation so its sibling
    /// goes with it and both balances stay symmetric.
    pub fn delete_transaction(&self, id: Uuid) -> Result<()> {
        let transaction = self.store.transaction(id)?;
        match transaction.kind() {
            TransactionKind::TransferLeg => {
                // kind() guarantees the id is present
                let transfer_id = transaction.transfer_id.ok_or_else(|| {
                    LedgerError::Integrity(format!("transfer leg {} lost its transfer id", id))
                })?;
                self.transfers().cancel_transfer(transfer_id)
            }
            TransactionKind::CardPurchase => {
                self.store.delete_transaction(id)?;
                Ok(())
            }
            TransactionKind::Plain => {
                self.reconciler().apply_delete(&transaction)?;
                self.store.delete_transaction(id)?;
                Ok(())
            }
        }
    }

    /// Deletes a whole card-purchase series.
    pub fn delete_card_purchase(&self, series_id: Uuid) -> Result<usize> {
        let removed = self.store.delete_series(series_id)?;
        if removed == 0 {
            return Err(LedgerError::Validation(format!(
                "installment series {} does not exist",
                series_id
            )));
        }
        Ok(removed)
    }

    /// Moves funds between two accounts as a linked pair of transactions.
    pub fn create_transfer(
        &self,
        from_account: Uuid,
        to_account: Uuid,
        amount: Money,
        date: NaiveDate,
        category_id: Option<Uuid>,
        description: Option<String>,
    ) -> Result<TransferPair> {
        self.transfers()
            .create_transfer(from_account, to_account, amount, date, category_id, description)
    }

    pub fn cancel_transfer(&self, transfer_id: Uuid) -> Result<()> {
        self.transfers().cancel_transfer(transfer_id)
    }

    /// Resolves both legs of a transfer for display as one operation.
    pub fn resolve_transfer(&self, transfer_id: Uuid) -> Result<TransferPair> {
        self.transfers().resolve_transfer(transfer_id)
    }

    /// Gets or creates the bill a purchase date falls into on a card.
    pub fn bill_for_purchase(
        &self,
        card_id: Uuid,
        purchase_date: NaiveDate,
    ) -> Result<crate::domain::CreditCardBill> {
        BillingService::new(&self.store).get_or_create_bill(card_id, purchase_date)
    }

    fn reconciler(&self) -> BalanceReconciler<'_, S> {
        BalanceReconciler::new(&self.store)
    }

    fn expander(&self) -> InstallmentExpander<'_, S> {
        InstallmentExpander::new(&self.store)
    }

    fn transfers(&self) -> TransferCoordinator<'_, S> {
        TransferCoordinator::new(&self.store)
    }
}

fn validate_draft(draft: &TransactionDraft) -> Result<()> {
    if !draft.amount.abs().is_positive() {
        return Err(LedgerError::Validation(
            "transaction amount must be positive".into(),
        ));
    }
    if draft.description.trim().is_empty() {
        return Err(LedgerError::Validation(
            "transaction description must not be empty".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, CreditCard};
    use crate::store::{AccountStore, CreditCardStore, MemoryStore, TransactionStore};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_account(balance_cents: i64) -> (TransactionLedger<MemoryStore>, Uuid) {
        let store = MemoryStore::new();
        let account = Account::new("Checking")
            .with_opening_balance(Money::from_cents(balance_cents));
        let account_id = account.id;
        store.insert_account(account).unwrap();
        (TransactionLedger::new(store), account_id)
    }

    fn draft(account_id: Uuid, direction: Direction, cents: i64) -> TransactionDraft {
        TransactionDraft {
            account_id,
            direction,
            amount: Money::from_cents(cents),
            date: date(2025, 1, 10),
            status: TransactionStatus::Completed,
            category_id: None,
            description: "coffee".into(),
        }
    }

    #[test]
    fn rejects_non_positive_amount_before_writing() {
        let (ledger, account_id) = ledger_with_account(10_000);
        let err = ledger
            .add_transaction(draft(account_id, Direction::Expense, 0))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert!(ledger.store().by_account(account_id).unwrap().is_empty());
    }

    #[test]
    fn kind_change_edit_fails_fast() {
        let (ledger, account_id) = ledger_with_account(10_000);
        let card = CreditCard::new("Visa", 10, 17).unwrap();
        let card_id = card.id;
        ledger.store().insert_card(card).unwrap();

        let purchase = ledger
            .add_card_purchase(
                card_id,
                &InstallmentPlan {
                    description: "headphones".into(),
                    total_amount: Money::from_cents(9_900),
                    start_date: date(2025, 1, 12),
                    installments: 1,
                    category_id: None,
                },
            )
            .unwrap();

        // Trying to edit the card row as if it were a plain transaction.
        let err = ledger
            .edit_transaction(purchase[0].id, draft(account_id, Direction::Expense, 500))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn delete_of_transfer_leg_cancels_the_pair() {
        let store = MemoryStore::new();
        let a = Account::new("A").with_opening_balance(Money::from_cents(30_000));
        let b = Account::new("B").with_opening_balance(Money::from_cents(5_000));
        let (a_id, b_id) = (a.id, b.id);
        store.insert_account(a).unwrap();
        store.insert_account(b).unwrap();
        let ledger = TransactionLedger::new(store);

        let pair = ledger
            .create_transfer(a_id, b_id, Money::from_cents(4_000), date(2025, 2, 1), None, None)
            .unwrap();

        ledger.delete_transaction(pair.credit.id).unwrap();
        assert_eq!(
            ledger.store().account(a_id).unwrap().balance,
            Money::from_cents(30_000)
        );
        assert_eq!(
            ledger.store().account(b_id).unwrap().balance,
            Money::from_cents(5_000)
        );
        assert!(ledger
            .store()
            .by_transfer(pair.debit.transfer_id.unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn delete_missing_series_is_a_validation_error() {
        let (ledger, _) = ledger_with_account(0);
        assert!(matches!(
            ledger.delete_card_purchase(Uuid::new_v4()),
            Err(LedgerError::Validation(_))
        ));
    }
}
