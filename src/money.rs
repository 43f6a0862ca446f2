//! Rupee amounts held as integer paise.
//!
//! Arithmetic on line items happens in [`Decimal`]; amounts are rounded into
//! [`Money`] once per line so that summing many lines never drifts.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in paise (1/100 rupee). Arithmetic saturates at the bounds of
/// `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    pub const fn paise(self) -> i64 {
        self.0
    }

    /// Whole rupees, truncated toward zero.
    pub const fn rupees(self) -> i64 {
        self.0 / 100
    }

    /// The paise left over after whole rupees.
    pub const fn paise_part(self) -> i64 {
        self.0 % 100
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Round to two decimal places, half away from zero. Saturates at the
    /// bounds of `i64` paise.
    pub fn from_decimal(value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let paise = rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|paise| paise.to_i64())
            .unwrap_or(if value.is_sign_negative() {
                i64::MIN
            } else {
                i64::MAX
            });
        Money(paise)
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::from_decimal(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.to_decimal()
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Formats with Indian digit grouping, e.g. `12,34,567.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let text = format!("{sign}{}.{:02}", group_indian(abs / 100), abs % 100);
        f.pad(&text)
    }
}

/// Last three digits, then groups of two: 1234567 -> "12,34,567".
fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::with_capacity(head.len() / 2 + 1);
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}
