//! Decimal amount to base-unit conversion.

use num_bigint::BigUint;
use num_traits::pow;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("Invalid amount `{0}`")]
    InvalidValue(String),
    #[error("Amount `{0}` has too many decimal points")]
    TooManyDecimalPoints(String),
    #[error("Amount `{amount}` has more than {decimals} decimal places")]
    TooManyDecimalPlaces { amount: String, decimals: u32 },
}

/// Convert a decimal amount like `"0.1"` into base units (`amount * 10^decimals`).
pub fn parse_units(amount: &str, decimals: u32) -> Result<BigUint, UnitsError> {
    if amount.is_empty() || amount == "." {
        return Err(UnitsError::InvalidValue(amount.to_string()));
    }

    let mut parts = amount.split('.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(UnitsError::TooManyDecimalPoints(amount.to_string()));
    }

    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(UnitsError::InvalidValue(amount.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimalPlaces {
            amount: amount.to_string(),
            decimals,
        });
    }

    let padded = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    let digits = padded.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(BigUint::from(0u32));
    }

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| UnitsError::InvalidValue(amount.to_string()))
}

/// `10^decimals`
pub fn unit(decimals: u32) -> BigUint {
    pow(BigUint::from(10u32), decimals as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_amount() {
        assert_eq!(parse_units("1", 18).unwrap(), unit(18));
        assert_eq!(parse_units("100", 18).unwrap(), unit(18) * 100u32);
    }

    #[test]
    fn test_fractional_amount() {
        assert_eq!(parse_units("0.1", 18).unwrap(), unit(17));
        assert_eq!(parse_units("1.5", 6).unwrap(), BigUint::from(1_500_000u32));
        assert_eq!(parse_units(".5", 1).unwrap(), BigUint::from(5u32));
        assert_eq!(parse_units("2.", 2).unwrap(), BigUint::from(200u32));
    }

    #[test]
    fn test_zero() {
        assert_eq!(parse_units("0", 18).unwrap(), BigUint::from(0u32));
        assert_eq!(parse_units("0.000", 3).unwrap(), BigUint::from(0u32));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_units(".", 18), Err(UnitsError::InvalidValue(_))));
        assert!(matches!(
            parse_units("1.2.3", 18),
            Err(UnitsError::TooManyDecimalPoints(_))
        ));
        assert!(matches!(
            parse_units("0.1234567", 6),
            Err(UnitsError::TooManyDecimalPlaces { decimals: 6, .. })
        ));
        assert!(matches!(parse_units("-1", 18), Err(UnitsError::InvalidValue(_))));
        assert!(matches!(parse_units("1e3", 18), Err(UnitsError::InvalidValue(_))));
    }
}
