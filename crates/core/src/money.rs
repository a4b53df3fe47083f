use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A currency amount held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> Option<i64> {
        (self.0 * Decimal::from(100)).round().to_i64()
    }

    /// Rounds half-to-even, which is what the source spreadsheets were produced with.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    /// Lenient amount parser: tolerates `$`, thousands separators, spaces and
    /// accounting parentheses. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        parse_amount(s).map(Money::from_decimal)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// `unit_price * quantity`, rounded to two places only after multiplying.
    /// `None` on overflow.
    pub fn total_of(unit_price: Decimal, quantity: u32) -> Option<Self> {
        unit_price
            .checked_mul(Decimal::from(quantity))
            .map(Money::from_decimal)
    }

    /// How many whole units of `unit_price` make up `self`, if the division is exact.
    pub fn whole_units_of(self, unit_price: Decimal) -> Option<u32> {
        if unit_price.is_zero() {
            return None;
        }
        let units = self.0.checked_div(unit_price)?;
        if units.is_sign_negative() || units.fract() != Decimal::ZERO {
            return None;
        }
        units.to_u32()
    }
}

/// Same leniency as [`Money::parse`] but keeps every decimal place, for unit
/// prices that are carried through unrounded.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') && s.len() >= 2 {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned = s.replace([',', '$', ' '], "");
    if cleaned.is_empty() {
        return None;
    }
    let dec = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -dec } else { dec })
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}
