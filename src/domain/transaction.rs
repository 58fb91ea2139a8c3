use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::{Direction, Money};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Completed,
    Pending,
}

/// A single ledger row.
///
/// Exactly one of two homes: a plain transaction carries `account_id` and
/// participates in that account's running balance when completed, while a
/// credit-card purchase carries `credit_card_bill_id` and is aggregated into
/// the bill instead. Transfer legs are plain transactions that additionally
/// share a `transfer_id` with exactly one sibling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    /// Signed amount in cents: negative = expense, positive = income.
    pub amount: Money,
    pub date: NaiveDate,
    pub status: TransactionStatus,
    pub account_id: Option<Uuid>,
    pub credit_card_bill_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub transfer_id: Option<Uuid>,
    /// Groups the rows of one expanded installment purchase. Set for every
    /// card purchase so edits can re-expand the series by id.
    pub series_id: Option<Uuid>,
    #[serde(default = "default_one")]
    pub installment_number: u32,
    #[serde(default = "default_one")]
    pub total_installments: u32,
    pub description: String,
}

fn default_one() -> u32 {
    1
}

/// Which ledger flow a transaction belongs to. Edits may never move a
/// transaction between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Plain,
    CardPurchase,
    TransferLeg,
}

impl Transaction {
    /// Creates a plain account transaction.
    pub fn new(
        account_id: Uuid,
        direction: Direction,
        magnitude: Money,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: direction.signed(magnitude),
            date,
            status: TransactionStatus::Completed,
            account_id: Some(account_id),
            credit_card_bill_id: None,
            category_id: None,
            transfer_id: None,
            series_id: None,
            installment_number: 1,
            total_installments: 1,
            description: description.into(),
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub fn kind(&self) -> TransactionKind {
        if self.transfer_id.is_some() {
            TransactionKind::TransferLeg
        } else if self.credit_card_bill_id.is_some() {
            TransactionKind::CardPurchase
        } else {
            TransactionKind::Plain
        }
    }

    /// A transaction moves an account balance iff it is linked to an account
    /// and completed. Bill-linked purchases never touch a balance directly.
    pub fn affects_balance(&self) -> bool {
        self.account_id.is_some() && self.status == TransactionStatus::Completed
    }

    /// The signed balance delta this transaction contributes to its account.
    pub fn impact(&self) -> Money {
        if self.affects_balance() {
            self.amount
        } else {
            Money::ZERO
        }
    }

    pub fn is_installment(&self) -> bool {
        self.total_installments > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn impact_requires_account_and_completion() {
        let account = Uuid::new_v4();
        let txn = Transaction::new(
            account,
            Direction::Expense,
            Money::from_cents(500),
            date(2025, 1, 10),
            "groceries",
        );
        assert_eq!(txn.impact(), Money::from_cents(-500));

        let pending = txn.clone().with_status(TransactionStatus::Pending);
        assert_eq!(pending.impact(), Money::ZERO);

        let mut billed = txn;
        billed.account_id = None;
        billed.credit_card_bill_id = Some(Uuid::new_v4());
        assert_eq!(billed.impact(), Money::ZERO);
        assert_eq!(billed.kind(), TransactionKind::CardPurchase);
    }

    #[test]
    fn transfer_leg_kind_wins_over_plain() {
        let mut txn = Transaction::new(
            Uuid::new_v4(),
            Direction::Income,
            Money::from_cents(100),
            date(2025, 3, 1),
            "leg",
        );
        txn.transfer_id = Some(Uuid::new_v4());
        assert_eq!(txn.kind(), TransactionKind::TransferLeg);
    }
}
