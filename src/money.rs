use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Signed monetary amount in integer cents.
///
/// Negative values represent money leaving an account, positive values money
/// entering one. API surfaces that take user input work with an unsigned
/// magnitude plus a [`Direction`]; the sign is applied once, at the ledger
/// boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Direction of a ledger movement, carried explicitly instead of encoding it
/// in the sign of every caller-supplied amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Income,
    Expense,
}

impl Direction {
    /// Converts an unsigned magnitude into the signed ledger amount.
    pub fn signed(self, magnitude: Money) -> Money {
        match self {
            Direction::Income => magnitude.abs(),
            Direction::Expense => -magnitude.abs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_applies_direction_to_magnitude() {
        let magnitude = Money::from_cents(12_50);
        assert_eq!(Direction::Income.signed(magnitude), Money::from_cents(1250));
        assert_eq!(
            Direction::Expense.signed(magnitude),
            Money::from_cents(-1250)
        );
        // A carelessly pre-negated magnitude must not flip the direction.
        assert_eq!(
            Direction::Expense.signed(Money::from_cents(-1250)),
            Money::from_cents(-1250)
        );
    }

    #[test]
    fn display_formats_cents() {
        assert_eq!(Money::from_cents(123456).to_string(), "1234.56");
        assert_eq!(Money::from_cents(-50).to_string(), "-0.50");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn sum_of_amounts() {
        let total: Money = [10, -4, 6].into_iter().map(Money::from_cents).sum();
        assert_eq!(total, Money::from_cents(12));
    }
}
