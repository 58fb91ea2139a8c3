//! Ledger domain models shared by the reconciliation services.

pub mod account;
pub mod credit_card;
pub mod transaction;

pub use account::Account;
pub use credit_card::{BillStatus, CreditCard, CreditCardBill};
pub use transaction::{Transaction, TransactionKind, TransactionStatus};
