//! JSON snapshot persistence for a [`MemoryStore`].
//!
//! The whole store state is saved as one pretty-printed document, written to
//! a temp file first and renamed into place so a crash mid-write never
//! leaves a truncated snapshot behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Account, CreditCard, CreditCardBill, Transaction};

use super::{MemoryStore, Result, StoreError};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

const TMP_SUFFIX: &str = "tmp";

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub schema_version: u32,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub cards: Vec<CreditCard>,
    pub bills: Vec<CreditCardBill>,
}

pub fn save_to_path(store: &MemoryStore, path: &Path) -> Result<()> {
    let (accounts, transactions, cards, bills) = store.dump();
    let snapshot = StoreSnapshot {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        accounts,
        transactions,
        cards,
        bills,
    };
    let json = serde_json::to_string_pretty(&snapshot)?;
    let tmp = path.with_extension(TMP_SUFFIX);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<MemoryStore> {
    let data = fs::read_to_string(path)?;
    let snapshot: StoreSnapshot = serde_json::from_str(&data)?;
    if snapshot.schema_version > SNAPSHOT_SCHEMA_VERSION {
        return Err(StoreError::Snapshot(format!(
            "snapshot `{}` uses schema version {} which is newer than {}",
            path.display(),
            snapshot.schema_version,
            SNAPSHOT_SCHEMA_VERSION
        )));
    }
    Ok(MemoryStore::load(
        snapshot.accounts,
        snapshot.transactions,
        snapshot.cards,
        snapshot.bills,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Direction, Money};
    use crate::store::{AccountStore, TransactionStore};
    use chrono::NaiveDate;

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let store = MemoryStore::new();
        let account = Account::new("Checking").with_opening_balance(Money::from_cents(10_000));
        let account_id = account.id;
        store.insert_account(account).unwrap();
        store
            .insert_transaction(Transaction::new(
                account_id,
                Direction::Expense,
                Money::from_cents(2_500),
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                "dinner",
            ))
            .unwrap();

        save_to_path(&store, &path).unwrap();
        let restored = load_from_path(&path).unwrap();

        let account = restored.account(account_id).unwrap();
        assert_eq!(account.balance, Money::from_cents(10_000));
        assert_eq!(restored.by_account(account_id).unwrap().len(), 1);
    }

    #[test]
    fn newer_schema_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let json = format!(
            r#"{{"schema_version":{},"accounts":[],"transactions":[],"cards":[],"bills":[]}}"#,
            SNAPSHOT_SCHEMA_VERSION + 1
        );
        fs::write(&path, json).unwrap();
        assert!(load_from_path(&path).is_err());
    }
}
