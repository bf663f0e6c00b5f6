//! Fixed-point LNO amounts
//!
//! A [`Coin`] stores its value in base units, 1 LNO = 100000 units, so the
//! smallest representable amount is 0.00001 LNO.
//!
//! Two text forms exist:
//!
//! - scaled: the raw base-unit integer, parsed with [`SafeInt::parse`]
//! - LNO: a human decimal numeral such as `"100.00023"`
//!
//! The LNO conversions are exact inverses over the valid range
//! `[0.00001, 92233720368547]`:
//!
//! ```
//! use lino_core::Coin;
//!
//! let coin = Coin::from_lno("100.00023").unwrap();
//! assert_eq!(coin.amount.to_text(), "10000023");
//! assert_eq!(coin.to_lno(), "100.00023");
//! ```

use crate::error::{Error, Result};
use crate::safe_int::SafeInt;
use num_bigint::BigInt;
use num_rational::BigRational;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of implied decimal digits
pub const DECIMAL_SCALE: u32 = 5;

/// Base units per LNO
pub const UNITS_PER_LNO: i64 = 100_000;

/// Largest whole-LNO value accepted by [`Coin::from_lno`]
pub const MAX_LNO: i64 = i64::MAX / UNITS_PER_LNO;

/// Monetary amount in base units
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Default, Serialize, Deserialize)]
pub struct Coin {
    /// Amount multiplied by 10^5
    pub amount: SafeInt,
}

impl Coin {
    /// Wrap a scaled amount
    pub fn new(amount: SafeInt) -> Self {
        Self { amount }
    }

    /// Zero coin
    pub fn zero() -> Self {
        Self::new(SafeInt::zero())
    }

    /// Coin from a scaled machine integer
    pub fn from_i64(amount: i64) -> Self {
        Self::new(SafeInt::from_i64(amount))
    }

    /// Parse an already scaled integer string. `None` if it is not a valid
    /// SafeInt literal.
    pub fn from_scaled_str(s: &str) -> Option<Self> {
        SafeInt::parse(s).ok().map(Self::new)
    }

    /// Convert an LNO decimal string to a coin.
    ///
    /// Fails with [`Error::Parse`] for anything that is not an unsigned
    /// decimal numeral, [`Error::Underflow`] below 0.00001 and
    /// [`Error::Overflow`] above [`MAX_LNO`]. Digits past the fifth decimal
    /// place are truncated.
    pub fn from_lno(lino: &str) -> Result<Self> {
        let value = parse_decimal(lino)
            .ok_or_else(|| Error::Parse(format!("invalid LNO amount {:?}", lino)))?;

        let units = BigInt::from(UNITS_PER_LNO);
        let min = BigRational::new(BigInt::from(1), units.clone());
        let max = BigRational::from_integer(BigInt::from(MAX_LNO));

        if value < min {
            return Err(Error::Underflow(format!(
                "LNO amount {} is below 0.00001",
                lino
            )));
        }
        if value > max {
            return Err(Error::Overflow(format!(
                "LNO amount {} is above {}",
                lino, MAX_LNO
            )));
        }

        let scaled = (value * BigRational::from_integer(units)).trunc().to_integer();
        let amount = SafeInt::from_bigint(scaled)
            .ok_or_else(|| Error::Overflow(format!("LNO amount {} is too wide", lino)))?;
        Ok(Self::new(amount))
    }

    /// Render as an LNO decimal string, the inverse of [`Coin::from_lno`].
    ///
    /// Whole amounts print without a fractional part and fractional amounts
    /// print without trailing zeros: `123`, `12.3`, `0.00123`.
    pub fn to_lno(&self) -> String {
        if self.amount.is_zero() {
            return "0".to_string();
        }

        let text = self.amount.abs().to_text();
        let sign = if self.amount.sign() < 0 { "-" } else { "" };
        let scale = DECIMAL_SCALE as usize;

        let num_zero = text.len() - text.trim_end_matches('0').len();
        if num_zero >= scale {
            return format!("{}{}", sign, &text[..text.len() - scale]);
        }

        let remain = scale - num_zero;
        let digits = text.trim_end_matches('0');
        if digits.len() > remain {
            let point = digits.len() - remain;
            format!("{}{}.{}", sign, &digits[..point], &digits[point..])
        } else {
            format!("{}0.{}{}", sign, "0".repeat(remain - digits.len()), digits)
        }
    }

    /// Convert to a `Decimal` with five fractional digits, if the scaled
    /// amount fits in an `i64`
    pub fn to_decimal(&self) -> Option<Decimal> {
        self.amount
            .to_i64()
            .map(|units| Decimal::new(units, DECIMAL_SCALE))
    }

    /// Convert from a `Decimal`, with the same rules as [`Coin::from_lno`]
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        Self::from_lno(&value.to_string())
    }

    /// Sum. Panics on SafeInt overflow.
    pub fn plus(&self, other: &Coin) -> Coin {
        Self::new(self.amount.add(&other.amount))
    }

    /// Difference. Panics on SafeInt overflow.
    pub fn minus(&self, other: &Coin) -> Coin {
        Self::new(self.amount.sub(&other.amount))
    }

    /// Negated amount
    pub fn neg(&self) -> Coin {
        Self::new(self.amount.neg())
    }

    /// True if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// True if strictly above zero
    pub fn is_positive(&self) -> bool {
        self.amount.sign() > 0
    }

    /// True if zero or above
    pub fn is_not_negative(&self) -> bool {
        self.amount.sign() >= 0
    }

    /// Strictly greater than `other`
    pub fn is_gt(&self, other: &Coin) -> bool {
        self.amount.compare(&other.amount).is_gt()
    }

    /// Greater than or equal to `other`
    pub fn is_gte(&self, other: &Coin) -> bool {
        self.amount.compare(&other.amount).is_ge()
    }

    /// Same amount as `other`
    pub fn is_equal(&self, other: &Coin) -> bool {
        self.amount.compare(&other.amount).is_eq()
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lno())
    }
}

/// Parse `digits[.digits]` into an exact rational. No sign, exponent or
/// separators.
fn parse_decimal(s: &str) -> Option<BigRational> {
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (s, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.contains('.') && (frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let numer = BigInt::parse_bytes(format!("{}{}", whole, frac).as_bytes(), 10)?;
    let denom = num_traits::pow(BigInt::from(10), frac.len());
    Some(BigRational::new(numer, denom))
}
