//! Money Module
//!
//! All balances and transfer amounts are exact decimals (`rust_decimal`).
//! Client-facing amounts arrive as strings and MUST go through
//! [`parse_amount`] before they reach the wallet or transfer logic.
//!
//! ## Rules
//! 1. No floating point anywhere in the balance path
//! 2. Explicit errors, no silent rounding or truncation
//! 3. At most [`MAX_SCALE`] fractional digits

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Maximum number of fractional digits accepted for an amount
pub const MAX_SCALE: u32 = 8;

/// Money conversion and validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must be positive")]
    NotPositive,

    #[error("Amount cannot be negative")]
    Negative,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Parse a client amount string into a non-negative decimal
///
/// Rejects `.5` (use `0.5`), `5.` (use `5` or `5.0`), empty strings,
/// scientific notation, negative values and anything with more than
/// [`MAX_SCALE`] decimals.
pub fn parse_amount(amount_str: &str) -> Result<Decimal, MoneyError> {
    let s = amount_str.trim();
    if s.is_empty() {
        return Err(MoneyError::InvalidFormat("amount cannot be empty".into()));
    }
    if s.starts_with('.') {
        return Err(MoneyError::InvalidFormat("use 0.5 not .5".into()));
    }
    if s.ends_with('.') {
        return Err(MoneyError::InvalidFormat("use 5.0 not 5.".into()));
    }
    if s.contains('e') || s.contains('E') {
        return Err(MoneyError::InvalidFormat(
            "scientific notation not allowed".into(),
        ));
    }

    let value =
        Decimal::from_str(s).map_err(|e| MoneyError::InvalidFormat(format!("{}: {}", s, e)))?;

    ensure_non_negative(value)?;
    ensure_scale(value)?;
    Ok(value)
}

/// Require `amount > 0`
#[inline]
pub fn ensure_positive(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::NotPositive);
    }
    Ok(amount)
}

/// Require `amount >= 0`
#[inline]
pub fn ensure_non_negative(amount: Decimal) -> Result<Decimal, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }
    Ok(amount)
}

/// Require at most [`MAX_SCALE`] significant fractional digits
///
/// Every amount that reaches a store passes this, so both backends hold the
/// same value (PostgreSQL columns are `NUMERIC(38, 8)`).
pub fn ensure_scale(amount: Decimal) -> Result<(), MoneyError> {
    let provided = amount.normalize().scale();
    if provided > MAX_SCALE {
        return Err(MoneyError::PrecisionOverflow {
            provided,
            max: MAX_SCALE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount_valid() {
        assert_eq!(parse_amount("40").unwrap(), dec!(40));
        assert_eq!(parse_amount("0.5").unwrap(), dec!(0.5));
        assert_eq!(parse_amount(" 12.25 ").unwrap(), dec!(12.25));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_format_errors() {
        assert!(matches!(parse_amount(""), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount(".5"), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount("5."), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(parse_amount("abc"), Err(MoneyError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_amount_rejects_scientific_notation() {
        for input in ["1e5", "1E5", "2.5e-3", "1e0"] {
            assert!(
                matches!(parse_amount(input), Err(MoneyError::InvalidFormat(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert_eq!(parse_amount("-1"), Err(MoneyError::Negative));
    }

    #[test]
    fn test_parse_amount_precision() {
        assert!(parse_amount("0.00000001").is_ok());
        assert_eq!(
            parse_amount("0.000000001"),
            Err(MoneyError::PrecisionOverflow {
                provided: 9,
                max: MAX_SCALE
            })
        );
        // Trailing zeros do not count against the limit
        assert!(parse_amount("1.0000000000").is_ok());
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(dec!(0.01)).is_ok());
        assert_eq!(ensure_positive(Decimal::ZERO), Err(MoneyError::NotPositive));
        assert_eq!(ensure_positive(dec!(-3)), Err(MoneyError::NotPositive));
    }

    #[test]
    fn test_ensure_scale() {
        assert!(ensure_scale(dec!(1.12345678)).is_ok());
        assert!(ensure_scale(dec!(2.500000000)).is_ok());
        assert_eq!(
            ensure_scale(dec!(0.123456789)),
            Err(MoneyError::PrecisionOverflow {
                provided: 9,
                max: MAX_SCALE
            })
        );
    }
}
