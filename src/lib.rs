#![doc(test(attr(deny(warnings))))]

//! Ledger Core is the transaction-ledger and credit-card-billing
//! reconciliation engine of a personal finance tracker: running account
//! balances, billing-cycle resolution, installment-series expansion, and
//! linked transfer pairs, all against a pluggable store boundary.

pub mod balance;
pub mod billing;
pub mod domain;
pub mod errors;
pub mod installment;
pub mod ledger;
pub mod money;
pub mod store;
pub mod transfer;

pub use balance::BalanceReconciler;
pub use billing::{resolve_cycle, BillingCycle, BillingService};
pub use domain::{Account, BillStatus, CreditCard, CreditCardBill, Transaction, TransactionStatus};
pub use errors::{LedgerError, Result};
pub use installment::{InstallmentExpander, InstallmentPlan};
pub use ledger::{TransactionDraft, TransactionLedger};
pub use money::{Direction, Money};
pub use transfer::{TransferCoordinator, TransferPair};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("ledger_core=info".parse().unwrap());
        fmt().with_env_filter(filter).init();
        tracing::info!("Ledger Core tracing initialized.");
    });
}
