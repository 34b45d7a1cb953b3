//! Fixed-point money amounts.
//!
//! Subscription prices arrive as text ("15.99"). They are held as whole cents
//! so sums never drift the way binary floating point does.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// A non-negative amount of money in cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build an amount from a number of cents. Negative input clamps to zero.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents.max(0))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Parse a textual decimal amount.
    ///
    /// Accepts optional surrounding whitespace, an optional leading `+`, and
    /// digits with an optional `.` fraction. Fractions beyond two digits are
    /// rounded half-up to the cent. Anything else (negative values, currency
    /// symbols, exponents, trailing junk) yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('+').unwrap_or(text);

        let (whole, fraction) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let mut cents: i64 = 0;
        for digit in whole.bytes() {
            cents = cents.checked_mul(10)?.checked_add(i64::from(digit - b'0'))?;
        }
        cents = cents.checked_mul(100)?;

        let mut frac_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        cents = cents.checked_add(tenths * 10 + hundredths)?;
        if frac_digits.next().is_some_and(|d| d >= 5) {
            cents = cents.checked_add(1)?;
        }

        Some(Self(cents))
    }

    /// Parse a textual amount, counting anything unparsable as zero.
    pub fn parse_or_zero(text: &str) -> Self {
        Self::parse(text).unwrap_or(Self::ZERO)
    }

    /// Whole currency units, rounded half-up.
    pub fn rounded_units(&self) -> i64 {
        (self.0 + 50) / 100
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
