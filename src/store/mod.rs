//! Boundary traits over the remote store the ledger writes against.
//!
//! Each ledger operation is a sequence of independent calls against these
//! traits with no cross-call atomicity; the services layered on top are
//! written with that in mind.

pub mod json;
pub mod memory;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Account, CreditCard, CreditCardBill, Transaction};
use crate::money::Money;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error("version conflict on account {0}")]
    VersionConflict(Uuid),
    #[error("snapshot error: {0}")]
    Snapshot(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait AccountStore {
    fn account(&self, id: Uuid) -> Result<Account>;
    /// Rejects a second default account with [`StoreError::Duplicate`].
    fn insert_account(&self, account: Account) -> Result<()>;
    /// Conditional balance write: fails with [`StoreError::VersionConflict`]
    /// unless the stored version still equals `expected_version`.
    fn update_balance(&self, id: Uuid, new_balance: Money, expected_version: u64) -> Result<()>;
    fn accounts(&self) -> Result<Vec<Account>>;
}

pub trait TransactionStore {
    fn insert_transaction(&self, transaction: Transaction) -> Result<()>;
    fn insert_transactions(&self, transactions: &[Transaction]) -> Result<()>;
    fn update_transaction(&self, transaction: Transaction) -> Result<()>;
    fn delete_transaction(&self, id: Uuid) -> Result<()>;
    /// Removes every row of an installment series, returning the count.
    fn delete_series(&self, series_id: Uuid) -> Result<usize>;
    fn transaction(&self, id: Uuid) -> Result<Transaction>;
    fn by_transfer(&self, transfer_id: Uuid) -> Result<Vec<Transaction>>;
    fn by_series(&self, series_id: Uuid) -> Result<Vec<Transaction>>;
    fn by_account(&self, account_id: Uuid) -> Result<Vec<Transaction>>;
}

pub trait CreditCardStore {
    fn card(&self, id: Uuid) -> Result<CreditCard>;
    fn insert_card(&self, card: CreditCard) -> Result<()>;
}

pub trait BillStore {
    fn find_bill(&self, card_id: Uuid, reference_month: NaiveDate)
        -> Result<Option<CreditCardBill>>;
    /// Unique on `(credit_card_id, reference_month)`; a second insert for
    /// the same cycle fails with [`StoreError::Duplicate`].
    fn insert_bill(&self, bill: CreditCardBill) -> Result<CreditCardBill>;
    fn bill(&self, id: Uuid) -> Result<CreditCardBill>;
}

/// Everything the ledger services need from a backing store.
pub trait LedgerStore: AccountStore + TransactionStore + CreditCardStore + BillStore {}

impl<T> LedgerStore for T where T: AccountStore + TransactionStore + CreditCardStore + BillStore {}

pub use memory::MemoryStore;
