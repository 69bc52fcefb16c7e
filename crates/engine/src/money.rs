use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Amount of money in cents.
///
/// Wallet balances, their income/expense totals and transaction amounts are
/// all kept as `Money`, so any sequence of bookings and reversals returns to
/// the exact starting value.
///
/// ```rust
/// use engine::Money;
///
/// let coffee: Money = "2,40".parse().unwrap();
/// assert_eq!(coffee, Money::new(240));
/// assert_eq!(coffee.to_string(), "2.40");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// A wallet balance below zero; amounts typed by users never are.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Reads an unsigned amount such as `12`, `12.5` or `12,50`. The
    /// transaction kind carries the direction, so a sign is an error.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let input = raw.trim();
        let invalid = || EngineError::Validation(format!("invalid amount '{input}'"));

        let (units, fraction) = input.split_once(['.', ',']).unwrap_or((input, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if units.is_empty() || !all_digits(units) || !all_digits(fraction) {
            return Err(invalid());
        }

        let fraction_cents = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            2 => fraction.parse::<i64>().map_err(|_| invalid())?,
            _ => {
                return Err(EngineError::Validation(format!(
                    "amount '{input}' has more than two decimals"
                )));
            }
        };

        units
            .parse::<i64>()
            .ok()
            .and_then(|units| units.checked_mul(100))
            .and_then(|cents| cents.checked_add(fraction_cents))
            .map(Money)
            .ok_or_else(|| EngineError::Validation(format!("amount '{input}' is too large")))
    }
}
