//! # Money Module
//!
//! Provides the `Money` and `Currency` types for handling monetary values
//! safely, plus the exact splitting primitives every other module relies on.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING LEAK                                                      │
//! │                                                                         │
//! │  Splitting a 10.00 pizza three ways with floats:                        │
//! │    10.00 / 3 = 3.33 (×3 = 9.99)  → 0.01 vanished from the bill!        │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units + explicit remainder                 │
//! │    1000 / 3 = 333 remainder 1                                           │
//! │    shares = [334, 333, 333]  → sum is exactly 1000                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use divvy_core::money::{Currency, Money};
//!
//! let usd = Currency::from_code("USD").unwrap();
//! let pizza = Money::parse("18.50", usd).unwrap();
//! assert_eq!(pizza.minor(), 1850);
//!
//! let shares = pizza.split_equally(3).unwrap();
//! let minors: Vec<i64> = shares.iter().map(|m| m.minor()).collect();
//! assert_eq!(minors, vec![617, 617, 616]);
//! ```

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Rate;

// =============================================================================
// Currency
// =============================================================================

/// ISO-4217 alphabetic currency code.
///
/// Stored as three ASCII uppercase bytes so `Money` stays `Copy`.
/// Serialized as a plain string (`"USD"`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Currency(#[ts(type = "string")] [u8; 3]);

impl Currency {
    /// Parses a three-letter code. Lowercase input is accepted.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::Currency;
    ///
    /// assert_eq!(Currency::from_code("tnd").unwrap().code(), "TND");
    /// assert!(Currency::from_code("DOLLAR").is_err());
    /// ```
    pub fn from_code(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        let bytes = code.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidFormat {
                field: "currency".to_string(),
                reason: format!("'{}' is not a three-letter ISO 4217 code", code),
            });
        }
        Ok(Currency([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    /// Returns the code as a string slice.
    pub fn code(&self) -> &str {
        // Bytes are validated ASCII on construction.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    /// Number of decimal places of the minor unit.
    ///
    /// ## Examples
    /// - `USD`, `EUR`: 2 (cents)
    /// - `TND`, `KWD`: 3 (millimes, fils)
    /// - `JPY`, `KRW`: 0
    pub fn exponent(&self) -> u32 {
        match self.code() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "XAF" | "XOF" => 0,
            "TND" | "BHD" | "KWD" | "JOD" | "OMR" | "IQD" | "LYD" => 3,
            _ => 2,
        }
    }

    /// Minor units per major unit (100 for USD, 1000 for TND).
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.exponent())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Currency::from_code(&code).map_err(de::Error::custom)
    }
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit, tagged with its currency.
///
/// ## Design Decisions
/// - **i64 (signed)**: net balances are negative for debtors
/// - **Currency tag**: mixing currencies is an error, not a silent bug
/// - **No float constructor**: amounts come from minor units or decimal text
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  LineItem.price ──► split_equally ──► participant item subtotal        │
/// │                                              │                          │
/// │  Surcharge.amount ──► proportional_split ────┤                          │
/// │                                              ▼                          │
/// │                                  Allocation ──► Transfer.amount        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates a Money value from minor units (cents, millimes, ...).
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::{Currency, Money};
    ///
    /// let tnd = Currency::from_code("TND").unwrap();
    /// let fare = Money::from_minor(15_250, tnd); // 15.250 TND
    /// assert_eq!(fare.to_string(), "15.250 TND");
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64, currency: Currency) -> Self {
        Money { minor, currency }
    }

    /// Creates a Money value from major and minor parts.
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50, usd)` = -5.50, not -4.50
    ///
    /// ## Errors
    /// - `Validation` when the amount does not fit in `i64` minor units
    pub fn from_major_minor(major: i64, minor: i64, currency: Currency) -> CoreResult<Self> {
        let scaled = major
            .checked_mul(currency.minor_per_major())
            .ok_or_else(|| overflow_error("amount"))?;
        let total = if major < 0 {
            scaled.checked_sub(minor)
        } else {
            scaled.checked_add(minor)
        };
        total
            .map(|minor| Money::from_minor(minor, currency))
            .ok_or_else(|| overflow_error("amount"))
    }

    /// Parses a decimal string such as `"18.50"` or `"-3"`.
    ///
    /// ## Rules
    /// - optional leading `-`
    /// - at most `currency.exponent()` fraction digits
    /// - digits only, no thousands separators
    pub fn parse(input: &str, currency: Currency) -> CoreResult<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            }
            .into());
        }

        let invalid = |reason: String| -> CoreError {
            ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason,
            }
            .into()
        };

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid(format!("'{}' is not a number", text)));
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid(format!("'{}' is not a number", text)));
        }

        let exponent = currency.exponent() as usize;
        if fraction.len() > exponent {
            return Err(invalid(format!(
                "{} allows at most {} decimal places",
                currency, exponent
            )));
        }

        let overflow = || -> CoreError {
            ValidationError::OutOfRange {
                field: "amount".to_string(),
                min: i64::MIN,
                max: i64::MAX,
            }
            .into()
        };

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let padded = format!("{:0<width$}", fraction, width = exponent);
        let fraction_value: i64 = if padded.is_empty() {
            0
        } else {
            padded.parse().map_err(|_| overflow())?
        };

        let magnitude = whole_value
            .checked_mul(currency.minor_per_major())
            .and_then(|v| v.checked_add(fraction_value))
            .ok_or_else(overflow)?;

        Ok(Money::from_minor(
            if negative { -magnitude } else { magnitude },
            currency,
        ))
    }

    /// Returns zero in the given currency.
    #[inline]
    pub const fn zero(currency: Currency) -> Self {
        Money { minor: 0, currency }
    }

    /// Returns the amount in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.minor
    }

    /// Returns the currency.
    #[inline]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money {
            minor: self.minor.abs(),
            currency: self.currency,
        }
    }

    /// Returns the negated value.
    #[inline]
    pub const fn negate(&self) -> Self {
        Money {
            minor: -self.minor,
            currency: self.currency,
        }
    }

    // =========================================================================
    // Checked Arithmetic
    // =========================================================================

    /// Exact sum of two amounts in the same currency.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::{Currency, Money};
    ///
    /// let usd = Currency::from_code("USD").unwrap();
    /// let eur = Currency::from_code("EUR").unwrap();
    /// let a = Money::from_minor(925, usd);
    ///
    /// assert_eq!(a.try_add(Money::from_minor(1200, usd)).unwrap().minor(), 2125);
    /// assert!(a.try_add(Money::from_minor(100, eur)).is_err());
    /// ```
    pub fn try_add(self, other: Money) -> CoreResult<Money> {
        self.ensure_same_currency(&other)?;
        self.minor
            .checked_add(other.minor)
            .map(|minor| Money::from_minor(minor, self.currency))
            .ok_or_else(|| overflow_error("amount"))
    }

    /// Exact difference of two amounts in the same currency.
    pub fn try_sub(self, other: Money) -> CoreResult<Money> {
        self.ensure_same_currency(&other)?;
        self.minor
            .checked_sub(other.minor)
            .map(|minor| Money::from_minor(minor, self.currency))
            .ok_or_else(|| overflow_error("amount"))
    }

    /// Sums a sequence of amounts that must all be in `currency`.
    ///
    /// An empty sequence sums to zero.
    pub fn sum<I>(currency: Currency, amounts: I) -> CoreResult<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::{Currency, Money};
    ///
    /// let usd = Currency::from_code("USD").unwrap();
    /// let cola = Money::from_minor(250, usd);
    /// assert_eq!(cola.multiply_quantity(2).unwrap().minor(), 500);
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> CoreResult<Money> {
        self.minor
            .checked_mul(qty)
            .map(|minor| Money::from_minor(minor, self.currency))
            .ok_or_else(|| overflow_error("quantity"))
    }

    /// Applies a rate (basis points), rounding half away from zero.
    ///
    /// ## Implementation
    /// Integer math: `(|amount| * bps + 5000) / 10000`, sign restored after.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::{Currency, Money};
    /// use divvy_core::types::Rate;
    ///
    /// let usd = Currency::from_code("USD").unwrap();
    /// let subtotal = Money::from_minor(1000, usd); // 10.00
    /// // 10.00 × 8.25% = 0.825 → 0.83
    /// assert_eq!(subtotal.apply_rate(Rate::from_bps(825)).unwrap().minor(), 83);
    /// ```
    ///
    /// ## Errors
    /// - `Validation` when the result does not fit in `i64` minor units
    pub fn apply_rate(&self, rate: Rate) -> CoreResult<Money> {
        // i128 keeps large amounts from overflowing before the division
        let product = (self.minor as i128).abs() * rate.bps() as i128;
        let rounded = (product + 5_000) / 10_000;
        let signed = if self.minor < 0 { -rounded } else { rounded };
        i64::try_from(signed)
            .map(|minor| Money::from_minor(minor, self.currency))
            .map_err(|_| overflow_error("amount"))
    }

    // =========================================================================
    // Exact Splits
    // =========================================================================

    /// Splits the amount into `n` shares that sum exactly to the original.
    ///
    /// ## Remainder Rule
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  split_equally(1000, 3)                                             │
    /// │                                                                     │
    /// │  base      = floor(1000 / 3) = 333                                  │
    /// │  remainder = 1000 mod 3      = 1                                    │
    /// │                                                                     │
    /// │  shares[0] = 334   ◄── first `remainder` shares get +1              │
    /// │  shares[1] = 333                                                    │
    /// │  shares[2] = 333                                                    │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    /// Callers line shares up with participants in ascending id order, so
    /// the lowest ids absorb the extra minor units.
    ///
    /// Negative amounts use floor division as well, so the sum still
    /// reconstructs the original exactly.
    pub fn split_equally(&self, n: usize) -> CoreResult<Vec<Money>> {
        if n == 0 {
            return Err(ValidationError::MustBePositive {
                field: "share count".to_string(),
            }
            .into());
        }

        let count = n as i64;
        let base = self.minor.div_euclid(count);
        let remainder = self.minor.rem_euclid(count) as usize;

        let shares: Vec<Money> = (0..n)
            .map(|i| {
                let extra = if i < remainder { 1 } else { 0 };
                Money::from_minor(base + extra, self.currency)
            })
            .collect();

        debug_assert_eq!(
            shares.iter().map(|s| s.minor as i128).sum::<i128>(),
            self.minor as i128,
            "split_equally must reconstruct the original amount"
        );
        Ok(shares)
    }

    /// Splits the amount in proportion to `weights`, exactly.
    ///
    /// ## Algorithm (largest remainder)
    /// 1. `share_i = floor(amount × w_i / W)` where `W = Σ w`
    /// 2. `leftover = amount − Σ share_i` (always `0 ≤ leftover < n`)
    /// 3. Hand one minor unit to each share in descending order of the
    ///    discarded remainder, ties broken by position, until exhausted
    ///
    /// Zero weights never receive a leftover unit, because their remainder
    /// is zero and at least `leftover` shares have a non-zero remainder.
    ///
    /// ## Example
    /// ```rust
    /// use divvy_core::money::{Currency, Money};
    ///
    /// let usd = Currency::from_code("USD").unwrap();
    /// let tax = Money::from_minor(305, usd);
    /// let shares = tax.proportional_split(&[2125, 925]).unwrap();
    /// assert_eq!(shares[0].minor(), 213);
    /// assert_eq!(shares[1].minor(), 92);
    /// ```
    pub fn proportional_split(&self, weights: &[i64]) -> CoreResult<Vec<Money>> {
        if weights.is_empty() {
            return Err(ValidationError::Required {
                field: "weights".to_string(),
            }
            .into());
        }
        if weights.iter().any(|w| *w < 0) {
            return Err(ValidationError::OutOfRange {
                field: "weight".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let total_weight: i128 = weights.iter().map(|w| *w as i128).sum();
        if total_weight == 0 {
            return Err(ValidationError::MustBePositive {
                field: "total weight".to_string(),
            }
            .into());
        }

        let amount = self.minor as i128;
        let mut floors: Vec<i128> = Vec::with_capacity(weights.len());
        let mut remainders: Vec<(i128, usize)> = Vec::with_capacity(weights.len());
        for (index, weight) in weights.iter().enumerate() {
            let scaled = amount * *weight as i128;
            floors.push(scaled.div_euclid(total_weight));
            remainders.push((scaled.rem_euclid(total_weight), index));
        }

        let distributed: i128 = floors.iter().sum();
        let leftover = (amount - distributed) as usize;

        // Largest remainder first; equal remainders keep their position order.
        remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        for (_, index) in remainders.into_iter().take(leftover) {
            floors[index] += 1;
        }

        let shares: Vec<Money> = floors
            .into_iter()
            .map(|minor| Money::from_minor(minor as i64, self.currency))
            .collect();

        debug_assert_eq!(
            shares.iter().map(|s| s.minor as i128).sum::<i128>(),
            amount,
            "proportional_split must reconstruct the original amount"
        );
        Ok(shares)
    }

    fn ensure_same_currency(&self, other: &Money) -> CoreResult<()> {
        if self.currency != other.currency {
            return Err(CoreError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: other.currency.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn overflow_error(field: &str) -> CoreError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: i64::MIN,
        max: i64::MAX,
    }
    .into()
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows the amount with the currency's decimal places and code.
///
/// ## Note
/// This is for logs and the CLI report. The mobile front-end does its own
/// localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minor < 0 { "-" } else { "" };
        let magnitude = self.minor.unsigned_abs();
        let exponent = self.currency.exponent();
        if exponent == 0 {
            return write!(f, "{}{} {}", sign, magnitude, self.currency);
        }
        let scale = 10_u64.pow(exponent);
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            magnitude / scale,
            magnitude % scale,
            self.currency,
            width = exponent as usize
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn usd() -> Currency {
        Currency::from_code("USD").unwrap()
    }

    fn tnd() -> Currency {
        Currency::from_code("TND").unwrap()
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(usd().code(), "USD");
        assert_eq!(usd().exponent(), 2);
        assert_eq!(tnd().exponent(), 3);
        assert_eq!(Currency::from_code("jpy").unwrap().exponent(), 0);
        assert!(Currency::from_code("US").is_err());
        assert!(Currency::from_code("U5D").is_err());
    }

    #[test]
    fn test_currency_serde() {
        let json = serde_json::to_string(&tnd()).unwrap();
        assert_eq!(json, "\"TND\"");
        let back: Currency = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(back.code(), "EUR");
        assert!(serde_json::from_str::<Currency>("\"EURO\"").is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("18.50", usd()).unwrap().minor(), 1850);
        assert_eq!(Money::parse("18.5", usd()).unwrap().minor(), 1850);
        assert_eq!(Money::parse("12", usd()).unwrap().minor(), 1200);
        assert_eq!(Money::parse(".05", usd()).unwrap().minor(), 5);
        assert_eq!(Money::parse("-5.50", usd()).unwrap().minor(), -550);
        assert_eq!(Money::parse("15.250", tnd()).unwrap().minor(), 15_250);

        assert!(Money::parse("", usd()).is_err());
        assert!(Money::parse("1.234", usd()).is_err());
        assert!(Money::parse("1,50", usd()).is_err());
        assert!(Money::parse("abc", usd()).is_err());
        assert!(Money::parse(".", usd()).is_err());
        assert!(Money::parse("99999999999999999999", usd()).is_err());
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99, usd()).unwrap().minor(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50, usd()).unwrap().minor(), -550);
        assert_eq!(Money::from_major_minor(4, 500, tnd()).unwrap().minor(), 4500);
    }

    #[test]
    fn test_from_major_minor_overflow() {
        assert!(Money::from_major_minor(i64::MAX / 10, 0, usd()).is_err());
        assert!(Money::from_major_minor(i64::MIN / 100, 9, usd()).is_err());
        let max_major = i64::MAX / 100;
        assert!(Money::from_major_minor(max_major, 7, usd()).is_ok());
        assert!(Money::from_major_minor(max_major, 8, usd()).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099, usd()).to_string(), "10.99 USD");
        assert_eq!(Money::from_minor(500, usd()).to_string(), "5.00 USD");
        assert_eq!(Money::from_minor(-550, usd()).to_string(), "-5.50 USD");
        assert_eq!(Money::from_minor(0, usd()).to_string(), "0.00 USD");
        assert_eq!(Money::from_minor(15_250, tnd()).to_string(), "15.250 TND");
        let jpy = Currency::from_code("JPY").unwrap();
        assert_eq!(Money::from_minor(1200, jpy).to_string(), "1200 JPY");
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Money::from_minor(1000, usd());
        let b = Money::from_minor(500, usd());
        assert_eq!(a.try_add(b).unwrap().minor(), 1500);
        assert_eq!(a.try_sub(b).unwrap().minor(), 500);

        let err = a.try_add(Money::from_minor(1, tnd())).unwrap_err();
        assert!(matches!(err, CoreError::CurrencyMismatch { .. }));

        let max = Money::from_minor(i64::MAX, usd());
        assert!(max.try_add(Money::from_minor(1, usd())).is_err());
    }

    #[test]
    fn test_sum() {
        let total = Money::sum(
            usd(),
            [925, 1200, 305].map(|m| Money::from_minor(m, usd())),
        )
        .unwrap();
        assert_eq!(total.minor(), 2430);
        assert!(Money::sum(usd(), Vec::new()).unwrap().is_zero());
        assert!(Money::sum(usd(), vec![Money::from_minor(1, tnd())]).is_err());
    }

    #[test]
    fn test_apply_rate_rounds_half_away_from_zero() {
        let amount = Money::from_minor(1000, usd());
        assert_eq!(amount.apply_rate(Rate::from_bps(1000)).unwrap().minor(), 100);
        assert_eq!(amount.apply_rate(Rate::from_bps(825)).unwrap().minor(), 83);
        let refund = Money::from_minor(-1000, usd());
        assert_eq!(refund.apply_rate(Rate::from_bps(825)).unwrap().minor(), -83);
    }

    #[test]
    fn test_apply_rate_out_of_range() {
        // A rate read from untrusted JSON skips validation
        let huge: Rate = serde_json::from_str("4000000000").unwrap();
        let amount = Money::from_minor(i64::MAX / 2, usd());
        let err = amount.apply_rate(huge).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));

        let debt = Money::from_minor(i64::MIN, usd());
        assert!(debt.apply_rate(Rate::from_bps(20_000)).is_err());
        assert_eq!(
            debt.apply_rate(Rate::from_bps(10_000)).unwrap().minor(),
            i64::MIN
        );
    }

    #[test]
    fn test_split_equally_distributes_remainder_first() {
        let shares = Money::from_minor(1000, usd()).split_equally(3).unwrap();
        let minors: Vec<i64> = shares.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![334, 333, 333]);

        let shares = Money::from_minor(1850, usd()).split_equally(2).unwrap();
        assert!(shares.iter().all(|s| s.minor() == 925));

        assert!(Money::from_minor(100, usd()).split_equally(0).is_err());
    }

    #[test]
    fn test_split_equally_negative_amount() {
        let shares = Money::from_minor(-1000, usd()).split_equally(3).unwrap();
        let minors: Vec<i64> = shares.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![-333, -333, -334]);
        assert_eq!(minors.iter().sum::<i64>(), -1000);
    }

    #[test]
    fn test_proportional_split_ties_go_to_first_position() {
        // 305 × 2125 / 3050 = 212.5 and 305 × 925 / 3050 = 92.5
        let shares = Money::from_minor(305, usd())
            .proportional_split(&[2125, 925])
            .unwrap();
        assert_eq!(shares[0].minor(), 213);
        assert_eq!(shares[1].minor(), 92);
    }

    #[test]
    fn test_proportional_split_largest_remainder_wins() {
        // 100 split 1:1:1 → 33.33 each, one leftover unit to position 0
        let shares = Money::from_minor(100, usd())
            .proportional_split(&[1, 1, 1])
            .unwrap();
        let minors: Vec<i64> = shares.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![34, 33, 33]);

        // 10 split 1:2:7 → 1, 2, 7 exactly
        let shares = Money::from_minor(10, usd())
            .proportional_split(&[1, 2, 7])
            .unwrap();
        let minors: Vec<i64> = shares.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![1, 2, 7]);

        // 100 split 1:2 → 33.3 / 66.6; leftover goes to the larger remainder
        let shares = Money::from_minor(100, usd())
            .proportional_split(&[1, 2])
            .unwrap();
        let minors: Vec<i64> = shares.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![33, 67]);
    }

    #[test]
    fn test_proportional_split_zero_weight_gets_nothing() {
        let shares = Money::from_minor(101, usd())
            .proportional_split(&[0, 1, 1])
            .unwrap();
        let minors: Vec<i64> = shares.iter().map(Money::minor).collect();
        assert_eq!(minors, vec![0, 51, 50]);
    }

    #[test]
    fn test_proportional_split_rejects_bad_weights() {
        let amount = Money::from_minor(100, usd());
        assert!(amount.proportional_split(&[]).is_err());
        assert!(amount.proportional_split(&[0, 0]).is_err());
        assert!(amount.proportional_split(&[1, -1]).is_err());
    }
}
