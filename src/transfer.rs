//! Transfers between accounts as linked transaction pairs.
//!
//! A transfer is two opposite-signed transactions sharing a `transfer_id`.
//! There is no cross-call atomicity: if the second leg's write fails the
//! ledger is left with an unpaired leg, which later resolution surfaces as
//! an integrity error instead of masking.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::balance::BalanceReconciler;
use crate::domain::Transaction;
use crate::errors::{LedgerError, Result};
use crate::money::{Direction, Money};
use crate::store::LedgerStore;

/// Both legs of one logical transfer.
#[derive(Debug, Clone)]
pub struct TransferPair {
    pub debit: Transaction,
    pub credit: Transaction,
}

pub struct TransferCoordinator<'a, S: LedgerStore> {
    store: &'a S,
    reconciler: BalanceReconciler<'a, S>,
}

impl<'a, S: LedgerStore> TransferCoordinator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            reconciler: BalanceReconciler::new(store),
        }
    }

    /// Creates the linked pair and applies both balance effects.
    ///
    /// Legs are written debit-first, each followed by its balance update,
    /// so a failure part-way through never leaves a balance moved without
    /// its transaction row.
    pub fn create_transfer(
        &self,
        from_account: Uuid,
        to_account: Uuid,
        amount: Money,
        date: NaiveDate,
        category_id: Option<Uuid>,
        description: Option<String>,
    ) -> Result<TransferPair> {
        if from_account == to_account {
            return Err(LedgerError::Validation(
                "transfer source and destination accounts must differ".into(),
            ));
        }
        if !amount.abs().is_positive() {
            return Err(LedgerError::Validation(
                "transfer amount must be positive".into(),
            ));
        }

        let transfer_id = Uuid::new_v4();
        let description = description.unwrap_or_else(|| "Transfer".into());

        let mut debit = Transaction::new(
            from_account,
            Direction::Expense,
            amount,
            date,
            description.clone(),
        )
        .with_category(category_id);
        debit.transfer_id = Some(transfer_id);

        let mut credit =
            Transaction::new(to_account, Direction::Income, amount, date, description)
                .with_category(category_id);
        credit.transfer_id = Some(transfer_id);

        self.store.insert_transaction(debit.clone())?;
        self.reconciler.apply_create(&debit)?;
        self.store.insert_transaction(credit.clone())?;
        self.reconciler.apply_create(&credit)?;

        tracing::info!(
            transfer = %transfer_id,
            from = %from_account,
            to = %to_account,
            %amount,
            "created transfer pair"
        );
        Ok(TransferPair { debit, credit })
    }

    /// Fetches both legs of a transfer.
    ///
    /// Anything other than exactly one debit and one credit leg means an
    /// earlier operation partially failed; that is reported as an integrity
    /// error, never silently ignored.
    pub fn resolve_transfer(&self, transfer_id: Uuid) -> Result<TransferPair> {
        let legs = self.store.by_transfer(transfer_id)?;
        if legs.len() != 2 {
            return Err(LedgerError::Integrity(format!(
                "transfer {} resolves to {} legs, expected exactly 2",
                transfer_id,
                legs.len()
            )));
        }
        let mut debit = None;
        let mut credit = None;
        for leg in legs {
            if leg.amount.is_negative() {
                debit = Some(leg);
            } else {
                credit = Some(leg);
            }
        }
        match (debit, credit) {
            (Some(debit), Some(credit)) => Ok(TransferPair { debit, credit }),
            _ => Err(LedgerError::Integrity(format!(
                "transfer {} legs do not offset each other",
                transfer_id
            ))),
        }
    }

    /// Cancels a transfer: reverses each leg's balance effect and deletes
    /// both rows.
    pub fn cancel_transfer(&self, transfer_id: Uuid) -> Result<()> {
        let pair = self.resolve_transfer(transfer_id)?;
        for leg in [&pair.debit, &pair.credit] {
            self.reconciler.apply_delete(leg)?;
            self.store.delete_transaction(leg.id)?;
        }
        tracing::info!(transfer = %transfer_id, "cancelled transfer pair");
        Ok(())
    }
}
