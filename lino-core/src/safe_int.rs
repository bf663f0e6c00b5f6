//! Overflow-checked arbitrary precision integer
//!
//! `SafeInt` wraps a [`BigInt`] and holds it to a hard 255-bit magnitude
//! ceiling, mirroring the 256-bit integer format used on chain. The width is
//! re-checked after every operation.
//!
//! # Failure model
//!
//! - Parsing is a user input path and returns [`Error::Parse`].
//! - Arithmetic that exceeds the ceiling, and division by zero, panic. These
//!   indicate corrupted data or a logic error; values are never clamped.
//!   Callers that need a recoverable check use the `checked_*` variants.
//!
//! # Text form
//!
//! [`SafeInt::to_text`] produces canonical base-10 text. The same text is
//! used for display and persistence and parses back to an equal value.

use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// Largest permitted magnitude bit length
pub const MAX_BIT_LEN: u64 = 255;

/// Immutable signed integer bounded to [`MAX_BIT_LEN`] bits of magnitude
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Default)]
pub struct SafeInt(BigInt);

impl SafeInt {
    /// Zero
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// One
    pub fn one() -> Self {
        Self(BigInt::from(1))
    }

    /// Build from a machine integer (always within the ceiling)
    pub fn from_i64(value: i64) -> Self {
        Self(BigInt::from(value))
    }

    /// Parse a decimal, `0x`, `0o` or `0b` prefixed literal with optional sign
    pub fn parse(s: &str) -> Result<Self> {
        let value = parse_literal(s)
            .ok_or_else(|| Error::Parse(format!("invalid integer literal {:?}", s)))?;

        if value.bits() > MAX_BIT_LEN {
            return Err(Error::Parse(format!(
                "integer literal {:?} exceeds {} bits",
                s, MAX_BIT_LEN
            )));
        }

        Ok(Self(value))
    }

    /// Wrap a `BigInt`, returning `None` if it is wider than the ceiling
    pub fn from_bigint(value: BigInt) -> Option<Self> {
        if value.bits() > MAX_BIT_LEN {
            return None;
        }
        Some(Self(value))
    }

    /// Underlying value
    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Magnitude bit length
    pub fn bit_len(&self) -> u64 {
        self.0.bits()
    }

    /// Convert to `i64` if it fits
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Canonical base-10 text
    pub fn to_text(&self) -> String {
        self.0.to_string()
    }

    /// Sum, or `None` on overflow
    pub fn checked_add(&self, other: &SafeInt) -> Option<SafeInt> {
        Self::from_bigint(&self.0 + &other.0)
    }

    /// Difference, or `None` on overflow
    pub fn checked_sub(&self, other: &SafeInt) -> Option<SafeInt> {
        Self::from_bigint(&self.0 - &other.0)
    }

    /// Product, or `None` on overflow
    pub fn checked_mul(&self, other: &SafeInt) -> Option<SafeInt> {
        if self.0.is_zero() || other.0.is_zero() {
            return Some(Self::zero());
        }
        // Fast reject before allocating the product.
        if self.bit_len() + other.bit_len() - 1 > MAX_BIT_LEN {
            return None;
        }
        Self::from_bigint(&self.0 * &other.0)
    }

    /// Truncating quotient, or `None` if `other` is zero
    pub fn checked_div(&self, other: &SafeInt) -> Option<SafeInt> {
        if other.0.is_zero() {
            return None;
        }
        Some(Self(&self.0 / &other.0))
    }

    /// Sum. Panics if the result exceeds [`MAX_BIT_LEN`] bits.
    pub fn add(&self, other: &SafeInt) -> SafeInt {
        Self::checked(&self.0 + &other.0, "addition")
    }

    /// Difference. Panics if the result exceeds [`MAX_BIT_LEN`] bits.
    pub fn sub(&self, other: &SafeInt) -> SafeInt {
        Self::checked(&self.0 - &other.0, "subtraction")
    }

    /// Product. Panics if the result exceeds [`MAX_BIT_LEN`] bits.
    pub fn mul(&self, other: &SafeInt) -> SafeInt {
        if self.0.is_zero() || other.0.is_zero() {
            return Self::zero();
        }
        if self.bit_len() + other.bit_len() - 1 > MAX_BIT_LEN {
            panic!(
                "SafeInt overflow in multiplication: operands of {} and {} bits",
                self.bit_len(),
                other.bit_len()
            );
        }
        Self::checked(&self.0 * &other.0, "multiplication")
    }

    /// Truncating quotient. Panics if `other` is zero.
    pub fn div(&self, other: &SafeInt) -> SafeInt {
        if other.0.is_zero() {
            panic!("SafeInt division by zero");
        }
        Self(&self.0 / &other.0)
    }

    /// Negation
    pub fn neg(&self) -> SafeInt {
        Self(-&self.0)
    }

    /// Absolute value
    pub fn abs(&self) -> SafeInt {
        Self(self.0.abs())
    }

    /// Three-way comparison
    pub fn compare(&self, other: &SafeInt) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// -1, 0 or 1
    pub fn sign(&self) -> i32 {
        if self.0.is_zero() {
            0
        } else if self.0.is_negative() {
            -1
        } else {
            1
        }
    }

    /// True if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Smaller of the two values
    pub fn min(&self, other: &SafeInt) -> SafeInt {
        if self.0 <= other.0 {
            self.clone()
        } else {
            other.clone()
        }
    }

    fn checked(value: BigInt, op: &str) -> SafeInt {
        let bits = value.bits();
        if bits > MAX_BIT_LEN {
            panic!("SafeInt overflow in {}: result has {} bits", op, bits);
        }
        Self(value)
    }
}

fn parse_literal(s: &str) -> Option<BigInt> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = match body.get(..2) {
        Some("0x") | Some("0X") => (16, &body[2..]),
        Some("0o") | Some("0O") => (8, &body[2..]),
        Some("0b") | Some("0B") => (2, &body[2..]),
        _ => (10, body),
    };

    // from_str_radix tolerates its own sign and separators; we do not.
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

impl FromStr for SafeInt {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SafeInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SafeInt {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl Serialize for SafeInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_text())
    }
}

impl<'de> Deserialize<'de> for SafeInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        SafeInt::parse(&text).map_err(de::Error::custom)
    }
}

impl<'a> Add<&'a SafeInt> for &'a SafeInt {
    type Output = SafeInt;

    fn add(self, rhs: &'a SafeInt) -> SafeInt {
        SafeInt::add(self, rhs)
    }
}

impl<'a> Sub<&'a SafeInt> for &'a SafeInt {
    type Output = SafeInt;

    fn sub(self, rhs: &'a SafeInt) -> SafeInt {
        SafeInt::sub(self, rhs)
    }
}

impl<'a> Mul<&'a SafeInt> for &'a SafeInt {
    type Output = SafeInt;

    fn mul(self, rhs: &'a SafeInt) -> SafeInt {
        SafeInt::mul(self, rhs)
    }
}

impl<'a> Div<&'a SafeInt> for &'a SafeInt {
    type Output = SafeInt;

    fn div(self, rhs: &'a SafeInt) -> SafeInt {
        SafeInt::div(self, rhs)
    }
}

impl Neg for &SafeInt {
    type Output = SafeInt;

    fn neg(self) -> SafeInt {
        SafeInt::neg(self)
    }
}
