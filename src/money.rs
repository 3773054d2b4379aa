//! Money Module
//!
//! Exact-decimal monetary amounts. Every amount that enters or leaves the
//! ledger goes through [`Money`]; no binary floating point anywhere.
//!
//! ## Rules
//! - At most [`Money::MAX_SCALE`] fractional digits (matches `NUMERIC(20,5)`)
//! - At most [`Money::MAX_INTEGER_DIGITS`] integer digits
//! - Parsing never rounds: over-scale input is rejected, not truncated
//!
//! ## Usage
//! ```rust
//! use transfer_ledger::money::Money;
//!
//! let balance = Money::parse("100.00000").unwrap();
//! let amount = Money::parse("30.5").unwrap();
//! assert_eq!((balance - amount).to_string(), "69.5");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Why a literal could not become [`Money`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("empty amount")]
    Empty,

    #[error("not a decimal literal: '{0}'")]
    InvalidFormat(String),

    #[error("too many decimal places: provided {provided}, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("too many integer digits (max {max})")]
    TooLarge { max: u32 },
}

/// Exact decimal amount with a fixed maximum scale
///
/// Immutable: arithmetic returns a new value. Comparison is numeric, so
/// `1.5` and `1.50000` are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Money(Decimal);

impl Money {
    /// Maximum number of fractional digits
    pub const MAX_SCALE: u32 = 5;

    /// Maximum number of integer digits (`NUMERIC(20,5)` leaves 15)
    pub const MAX_INTEGER_DIGITS: u32 = 15;

    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Parse a client-supplied decimal literal
    ///
    /// Accepts an optional leading sign. Sign rules belong to the caller
    /// (a balance may be zero, a transfer amount must be positive).
    pub fn parse(input: &str) -> Result<Self, MoneyError> {
        let literal = Literal::split(input)?;

        // Limits are checked on the text so oversized literals never reach
        // Decimal parsing, which would round them
        let scale = u32::try_from(literal.fraction.len()).unwrap_or(u32::MAX);
        if scale > Self::MAX_SCALE {
            return Err(MoneyError::PrecisionOverflow {
                provided: scale,
                max: Self::MAX_SCALE,
            });
        }
        let integer = literal.integer.trim_start_matches('0');
        if integer.len() > Self::MAX_INTEGER_DIGITS as usize {
            return Err(MoneyError::TooLarge {
                max: Self::MAX_INTEGER_DIGITS,
            });
        }

        let sign = if literal.negative { "-" } else { "" };
        let integer = if integer.is_empty() { "0" } else { integer };
        let normalized = if literal.fraction.is_empty() {
            format!("{}{}", sign, integer)
        } else {
            format!("{}{}.{}", sign, integer, literal.fraction)
        };
        let value = Decimal::from_str_exact(&normalized)
            .map_err(|_| MoneyError::InvalidFormat(input.to_string()))?;
        Self::from_decimal(value)
    }

    /// Wrap an already-parsed decimal, enforcing scale and magnitude
    pub fn from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        if value.scale() > Self::MAX_SCALE {
            return Err(MoneyError::PrecisionOverflow {
                provided: value.scale(),
                max: Self::MAX_SCALE,
            });
        }
        if !Self::fits_storage(value) {
            return Err(MoneyError::TooLarge {
                max: Self::MAX_INTEGER_DIGITS,
            });
        }
        Ok(Self(value))
    }

    /// Whole units, e.g. `Money::from_units(100)` is `100`
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// True if `value` fits the storage column's integer digits
    pub fn fits_storage(value: Decimal) -> bool {
        value.abs().trunc() < Decimal::from(10i64.pow(Self::MAX_INTEGER_DIGITS))
    }

    #[inline]
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

/// A syntactically valid literal: optional sign, digits, optional `.digits`
struct Literal<'a> {
    negative: bool,
    integer: &'a str,
    fraction: &'a str,
}

impl<'a> Literal<'a> {
    /// No whitespace, exponents, separators, or bare leading/trailing dot
    fn split(input: &'a str) -> Result<Self, MoneyError> {
        if input.is_empty() {
            return Err(MoneyError::Empty);
        }
        let invalid = || MoneyError::InvalidFormat(input.to_string());

        let (negative, body) = if let Some(rest) = input.strip_prefix('-') {
            (true, rest)
        } else {
            (false, input.strip_prefix('+').unwrap_or(input))
        };
        let (integer, fraction) = match body.split_once('.') {
            Some((integer, fraction)) if !fraction.is_empty() => (integer, fraction),
            Some(_) => return Err(invalid()),
            None => (body, ""),
        };
        if integer.is_empty()
            || !integer.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self {
            negative,
            integer,
            fraction,
        })
    }

    fn sign(&self) -> Ordering {
        let zero = self
            .integer
            .bytes()
            .chain(self.fraction.bytes())
            .all(|b| b == b'0');
        match (zero, self.negative) {
            (true, _) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (false, false) => Ordering::Greater,
        }
    }
}

/// Sign of a decimal literal, read from its digits
///
/// Validates the format but applies no scale or magnitude limit, so callers
/// can check the sign before the scale. `-0` is zero.
pub fn literal_sign(input: &str) -> Result<Ordering, MoneyError> {
    Ok(Literal::split(input)?.sign())
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl fmt::Display for Money {
    /// Normalized rendering: `100.00000` → `100`, `69.50000` → `69.5`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
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

impl From<Money> for Decimal {
    fn from(m: Money) -> Decimal {
        m.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_literals() {
        assert_eq!(Money::parse("100").unwrap(), Money::from_units(100));
        assert_eq!(Money::parse("100.00000").unwrap(), Money::from_units(100));
        assert_eq!(Money::parse("0").unwrap(), Money::ZERO);
        assert!(Money::parse("-1.5").unwrap().is_negative());
        assert!(Money::parse("+2").unwrap().is_positive());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Money::parse(""), Err(MoneyError::Empty));
        assert!(matches!(Money::parse(" 30.5"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("1.50000 "), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("   "), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("--1"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("abc"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("1.2.3"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse(".5"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("5."), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("1e5"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("1_000"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(Money::parse("-"), Err(MoneyError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_rejects_over_scale() {
        assert_eq!(
            Money::parse("1.000001"),
            Err(MoneyError::PrecisionOverflow {
                provided: 6,
                max: 5
            })
        );
        // Trailing zeros still count as written scale
        assert!(Money::parse("1.500000").is_err());
        assert!(Money::parse("1.12345").is_ok());

        // Longer than Decimal can hold; must not round to zero
        assert_eq!(
            Money::parse("0.00000000000000000000000000000001"),
            Err(MoneyError::PrecisionOverflow {
                provided: 32,
                max: 5
            })
        );
        assert!(matches!(
            Money::parse("1.0000000000000000000000000000000000000001"),
            Err(MoneyError::PrecisionOverflow { .. })
        ));
    }

    #[test]
    fn test_literal_sign() {
        assert_eq!(literal_sign("30.5"), Ok(Ordering::Greater));
        assert_eq!(literal_sign("-0.00000000000000000000000000000001"), Ok(Ordering::Less));
        assert_eq!(literal_sign("0.00000000000000000000000000000001"), Ok(Ordering::Greater));
        assert_eq!(literal_sign("-0"), Ok(Ordering::Equal));
        assert_eq!(literal_sign("000.000"), Ok(Ordering::Equal));
        assert_eq!(literal_sign(""), Err(MoneyError::Empty));
        assert!(literal_sign("1e5").is_err());
    }

    #[test]
    fn test_parse_rejects_too_large() {
        assert!(Money::parse("999999999999999.99999").is_ok());
        assert_eq!(
            Money::parse("1000000000000000"),
            Err(MoneyError::TooLarge { max: 15 })
        );
        // Leading zeros are not significant
        assert_eq!(
            Money::parse("0000000000000000000000000000001.5").unwrap().to_string(),
            "1.5"
        );
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = Money::parse("0.1").unwrap();
        let b = Money::parse("0.2").unwrap();
        assert_eq!((a + b).to_string(), "0.3");

        let balance = Money::parse("100.00000").unwrap();
        let amount = Money::parse("30.5").unwrap();
        assert_eq!((balance - amount).to_string(), "69.5");
        assert_eq!(balance.to_string(), "100");
    }

    #[test]
    fn test_ordering() {
        let small = Money::parse("69.5").unwrap();
        let large = Money::parse("100").unwrap();
        assert!(small < large);
        assert_eq!(Money::parse("1.5").unwrap(), Money::parse("1.50000").unwrap());
        assert!(Money::ZERO.is_zero());
        assert!(!Money::ZERO.is_positive());
    }

    proptest! {
        #[test]
        fn prop_render_then_parse_is_lossless(units in 0i64..1_000_000_000_000, frac in 0u32..100_000) {
            let literal = format!("{}.{:05}", units, frac);
            let parsed = Money::parse(&literal).unwrap();
            let reparsed = Money::parse(&parsed.to_string()).unwrap();
            prop_assert_eq!(parsed, reparsed);
            prop_assert_eq!(parsed.as_decimal(), Decimal::from_str(&literal).unwrap());
        }
    }
}
