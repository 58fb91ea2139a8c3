use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Account, CreditCard, CreditCardBill, Transaction};
use crate::money::Money;

use super::{AccountStore, BillStore, CreditCardStore, Result, StoreError, TransactionStore};

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, Transaction>,
    cards: HashMap<Uuid, CreditCard>,
    bills: HashMap<Uuid, CreditCardBill>,
}

/// In-memory store backend.
///
/// Enforces the same constraints a relational backend would: a unique bill
/// per `(card, reference_month)`, at most one default account, and
/// version-checked balance writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn load(
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
        cards: Vec<CreditCard>,
        bills: Vec<CreditCardBill>,
    ) -> Self {
        let state = State {
            accounts: accounts.into_iter().map(|a| (a.id, a)).collect(),
            transactions: transactions.into_iter().map(|t| (t.id, t)).collect(),
            cards: cards.into_iter().map(|c| (c.id, c)).collect(),
            bills: bills.into_iter().map(|b| (b.id, b)).collect(),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub(crate) fn dump(
        &self,
    ) -> (
        Vec<Account>,
        Vec<Transaction>,
        Vec<CreditCard>,
        Vec<CreditCardBill>,
    ) {
        let state = self.read();
        let mut accounts: Vec<_> = state.accounts.values().cloned().collect();
        let mut transactions: Vec<_> = state.transactions.values().cloned().collect();
        let mut cards: Vec<_> = state.cards.values().cloned().collect();
        let mut bills: Vec<_> = state.bills.values().cloned().collect();
        accounts.sort_by_key(|a| a.id);
        transactions.sort_by_key(|t| (t.date, t.id));
        cards.sort_by_key(|c| c.id);
        bills.sort_by_key(|b| (b.credit_card_id, b.reference_month));
        (accounts, transactions, cards, bills)
    }
}

impl AccountStore for MemoryStore {
    fn account(&self, id: Uuid) -> Result<Account> {
        self.read()
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))
    }

    fn insert_account(&self, account: Account) -> Result<()> {
        let mut state = self.write();
        if account.is_default && state.accounts.values().any(|a| a.is_default) {
            return Err(StoreError::Duplicate("default account".into()));
        }
        state.accounts.insert(account.id, account);
        Ok(())
    }

    fn update_balance(&self, id: Uuid, new_balance: Money, expected_version: u64) -> Result<()> {
        let mut state = self.write();
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))?;
        if account.version != expected_version {
            return Err(StoreError::VersionConflict(id));
        }
        account.balance = new_balance;
        account.version += 1;
        Ok(())
    }

    fn accounts(&self) -> Result<Vec<Account>> {
        let mut accounts: Vec<_> = self.read().accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }
}

impl TransactionStore for MemoryStore {
    fn insert_transaction(&self, transaction: Transaction) -> Result<()> {
        self.write()
            .transactions
            .insert(transaction.id, transaction);
        Ok(())
    }

    fn insert_transactions(&self, transactions: &[Transaction]) -> Result<()> {
        let mut state = self.write();
        for transaction in transactions {
            state
                .transactions
                .insert(transaction.id, transaction.clone());
        }
        Ok(())
    }

    fn update_transaction(&self, transaction: Transaction) -> Result<()> {
        let mut state = self.write();
        if !state.transactions.contains_key(&transaction.id) {
            return Err(StoreError::NotFound(format!(
                "transaction {}",
                transaction.id
            )));
        }
        state.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    fn delete_transaction(&self, id: Uuid) -> Result<()> {
        self.write()
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", id)))
    }

    fn delete_series(&self, series_id: Uuid) -> Result<usize> {
        let mut state = self.write();
        let before = state.transactions.len();
        state
            .transactions
            .retain(|_, txn| txn.series_id != Some(series_id));
        Ok(before - state.transactions.len())
    }

    fn transaction(&self, id: Uuid) -> Result<Transaction> {
        self.read()
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("transaction {}", id)))
    }

    fn by_transfer(&self, transfer_id: Uuid) -> Result<Vec<Transaction>> {
        Ok(self.filtered(|txn| txn.transfer_id == Some(transfer_id)))
    }

    fn by_series(&self, series_id: Uuid) -> Result<Vec<Transaction>> {
        Ok(self.filtered(|txn| txn.series_id == Some(series_id)))
    }

    fn by_account(&self, account_id: Uuid) -> Result<Vec<Transaction>> {
        Ok(self.filtered(|txn| txn.account_id == Some(account_id)))
    }
}

impl MemoryStore {
    fn filtered(&self, predicate: impl Fn(&Transaction) -> bool) -> Vec<Transaction> {
        let mut matched: Vec<_> = self
            .read()
            .transactions
            .values()
            .filter(|txn| predicate(txn))
            .cloned()
            .collect();
        matched.sort_by_key(|txn| (txn.date, txn.installment_number, txn.id));
        matched
    }
}

impl CreditCardStore for MemoryStore {
    fn card(&self, id: Uuid) -> Result<CreditCard> {
        self.read()
            .cards
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("credit card {}", id)))
    }

    fn insert_card(&self, card: CreditCard) -> Result<()> {
        self.write().cards.insert(card.id, card);
        Ok(())
    }
}

impl BillStore for MemoryStore {
    fn find_bill(
        &self,
        card_id: Uuid,
        reference_month: NaiveDate,
    ) -> Result<Option<CreditCardBill>> {
        Ok(self
            .read()
            .bills
            .values()
            .find(|bill| {
                bill.credit_card_id == card_id && bill.reference_month == reference_month
            })
            .cloned())
    }

    fn insert_bill(&self, bill: CreditCardBill) -> Result<CreditCardBill> {
        let mut state = self.write();
        let collision = state.bills.values().any(|existing| {
            existing.credit_card_id == bill.credit_card_id
                && existing.reference_month == bill.reference_month
        });
        if collision {
            return Err(StoreError::Duplicate(format!(
                "bill for card {} in {}",
                bill.credit_card_id,
                bill.reference_month.format("%Y-%m")
            )));
        }
        state.bills.insert(bill.id, bill.clone());
        Ok(bill)
    }

    fn bill(&self, id: Uuid) -> Result<CreditCardBill> {
        self.read()
            .bills
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("bill {}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BillStatus;

    fn sample_bill(card_id: Uuid, month: NaiveDate) -> CreditCardBill {
        CreditCardBill {
            id: Uuid::new_v4(),
            credit_card_id: card_id,
            reference_month: month,
            closing_date: month,
            due_date: month,
            total_amount: Money::ZERO,
            paid_amount: Money::ZERO,
            status: BillStatus::Open,
        }
    }

    #[test]
    fn balance_update_is_version_checked() {
        let store = MemoryStore::new();
        let account = Account::new("Checking");
        let id = account.id;
        store.insert_account(account).unwrap();

        store
            .update_balance(id, Money::from_cents(100), 0)
            .unwrap();
        // Stale token: the first write bumped the version to 1.
        let err = store
            .update_balance(id, Money::from_cents(200), 0)
            .unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict(conflict) if conflict == id));
        assert_eq!(store.account(id).unwrap().balance, Money::from_cents(100));
        assert_eq!(store.account(id).unwrap().version, 1);
    }

    #[test]
    fn second_default_account_is_rejected() {
        let store = MemoryStore::new();
        store
            .insert_account(Account::new("Main").as_default())
            .unwrap();
        let err = store
            .insert_account(Account::new("Other").as_default())
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[test]
    fn bill_unique_per_card_and_month() {
        let store = MemoryStore::new();
        let card_id = Uuid::new_v4();
        let month = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        store.insert_bill(sample_bill(card_id, month)).unwrap();
        let err = store.insert_bill(sample_bill(card_id, month)).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        // A different card in the same month is fine.
        store
            .insert_bill(sample_bill(Uuid::new_v4(), month))
            .unwrap();
    }
}
