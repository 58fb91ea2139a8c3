//! Account-balance reconciliation.
//!
//! Computes and applies the balance delta an account incurs when a
//! transaction is created, edited, or deleted. A transaction moves a balance
//! iff it is account-linked and completed; everything else is a no-op here.

use uuid::Uuid;

use crate::domain::Transaction;
use crate::errors::{LedgerError, Result};
use crate::money::Money;
use crate::store::{AccountStore, StoreError};

pub struct BalanceReconciler<'a, S: AccountStore> {
    store: &'a S,
}

impl<'a, S: AccountStore> BalanceReconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Applies the balance effect of a newly created transaction.
    pub fn apply_create(&self, transaction: &Transaction) -> Result<()> {
        if let Some(account_id) = transaction.account_id {
            self.shift(account_id, transaction.impact())?;
        }
        Ok(())
    }

    /// Reverses the balance effect of a deleted transaction.
    pub fn apply_delete(&self, transaction: &Transaction) -> Result<()> {
        if let Some(account_id) = transaction.account_id {
            self.shift(account_id, -transaction.impact())?;
        }
        Ok(())
    }

    /// Reconciles an edit.
    ///
    /// On the same account the old and new impacts collapse into a single
    /// delta. When the account changed, the old impact is reversed on the
    /// old account before the new impact lands on the new one, so a
    /// concurrent reader never observes the amount counted twice.
    pub fn apply_edit(&self, old: &Transaction, new: &Transaction) -> Result<()> {
        if old.account_id == new.account_id {
            if let Some(account_id) = old.account_id {
                self.shift(account_id, new.impact() - old.impact())?;
            }
            return Ok(());
        }
        if let Some(old_account) = old.account_id {
            self.shift(old_account, -old.impact())?;
        }
        if let Some(new_account) = new.account_id {
            self.shift(new_account, new.impact())?;
        }
        Ok(())
    }

    /// Moves an account balance by `delta` with a conditional write.
    ///
    /// The account is re-read immediately before the write so the delta is
    /// applied to a fresh balance; if another writer got in between, the
    /// version check fails and the caller receives a retryable conflict.
    fn shift(&self, account_id: Uuid, delta: Money) -> Result<()> {
        if delta.is_zero() {
            return Ok(());
        }
        let account = self.store.account(account_id)?;
        let new_balance = account.balance + delta;
        match self
            .store
            .update_balance(account_id, new_balance, account.version)
        {
            Ok(()) => {
                tracing::info!(
                    account = %account_id,
                    %delta,
                    balance = %new_balance,
                    "applied balance delta"
                );
                Ok(())
            }
            Err(StoreError::VersionConflict(_)) => Err(LedgerError::Conflict(format!(
                "account {} was updated concurrently, retry the operation",
                account_id
            ))),
            Err(err) => Err(err.into()),
        }
    }
}
