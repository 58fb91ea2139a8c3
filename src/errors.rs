use thiserror::Error;

use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error type that captures the failure modes of ledger operations.
///
/// Every failure is scoped to a single operation; nothing here is fatal to
/// the process. `Integrity` signals damage left behind by an earlier partial
/// failure and is deliberately distinct from an ordinary `Store` failure.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected before any write reached the store.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// A read or write against the backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The stored data contradicts a ledger invariant.
    #[error("Ledger integrity violation: {0}")]
    Integrity(String),
    /// A concurrent update won the race; the operation can be retried.
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),
}
