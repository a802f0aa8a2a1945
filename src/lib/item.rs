use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::{fmt, iter, ops};

/// A monetary value in cents
///
/// Line totals and sums are computed on integers so that the subtotal
/// of an invoice is always exactly the sum of its printed line totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(pub i64);

impl Amount {
    pub const ZERO: Self = Amount(0);

    /// Convert a decimal price to cents, rounding half away from zero
    ///
    /// Also reports whether precision was lost in the conversion.
    /// `None` if the value does not fit.
    pub fn from_decimal(value: Decimal) -> Option<(Self, bool)> {
        let cents = value.checked_mul(Decimal::ONE_HUNDRED)?;
        let rounded = cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let exact = rounded == cents;
        let cents = rounded.to_i64()?;
        Some((Amount(cents), !exact))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Prefix with a currency symbol (`€1250.00`)
    pub fn with_symbol(self, symbol: &str) -> String {
        format!("{}{}", symbol, self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl ops::Add for Amount {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl ops::Mul<u32> for Amount {
    type Output = Self;
    fn mul(self, qty: u32) -> Self {
        Amount(self.0 * qty as i64)
    }
}

impl iter::Sum for Amount {
    fn sum<I>(iter: I) -> Self
    where I: Iterator<Item = Self> {
        iter.fold(Amount::ZERO, |acc, a| acc + a)
    }
}

/// One billable description/quantity/unit-price tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub description: String,
    pub unit_price: Amount,
    pub quantity: u32,
}

impl LineItem {
    pub fn total(&self) -> Amount {
        self.unit_price * self.quantity
    }
}
