use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ReconError, Result};

/// Zero amount as it appears in the input and in the generated SQL.
pub const ZERO: &str = "0.00";

fn parse(raw: &str) -> Result<Decimal> {
    let s = raw.trim();
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| ReconError::InvalidAmount(raw.to_string()))
}

/// Add two textual amounts exactly and round the result to kopecks with
/// banker's rounding: `sum("0.005", "0") == "0.00"`, `sum("0.015", "0") == "0.02"`.
pub fn sum(a: &str, b: &str) -> Result<String> {
    let total = parse(a)?
        .checked_add(parse(b)?)
        .ok_or_else(|| ReconError::InvalidAmount(format!("{} + {}", a.trim(), b.trim())))?;
    let mut rounded = total.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.rescale(2);
    Ok(rounded.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_pads_to_two_digits() {
        assert_eq!(sum("7", "1").unwrap(), "8.00");
        assert_eq!(sum("5.321", "-3.617").unwrap(), "1.70");
        assert_eq!(sum("0", "0").unwrap(), "0.00");
        assert_eq!(sum("1234.5", "0.05").unwrap(), "1234.55");
    }

    #[test]
    fn test_sum_half_to_even() {
        assert_eq!(sum("0.005", "0").unwrap(), "0.00");
        assert_eq!(sum("0.015", "0").unwrap(), "0.02");
        assert_eq!(sum("0.025", "0").unwrap(), "0.02");
        assert_eq!(sum("-0.015", "0").unwrap(), "-0.02");
    }

    #[test]
    fn test_sum_negative_sign_only_when_negative() {
        assert_eq!(sum("-10.00", "3").unwrap(), "-7.00");
        assert_eq!(sum("-0.004", "0").unwrap(), "0.00");
        assert_eq!(sum("100.00", "-100.00").unwrap(), "0.00");
    }

    #[test]
    fn test_sum_is_commutative() {
        let pairs = [("12.345", "0.005"), ("-3.1", "7.777"), ("0.1", "0.2"), ("1e2", "0.015")];
        for (a, b) in pairs {
            assert_eq!(sum(a, b).unwrap(), sum(b, a).unwrap());
        }
    }

    #[test]
    fn test_sum_is_exact_over_many_additions() {
        let mut total = ZERO.to_string();
        for _ in 0..1000 {
            total = sum(&total, "0.10").unwrap();
        }
        assert_eq!(total, "100.00");
    }

    #[test]
    fn test_sum_trims_whitespace() {
        assert_eq!(sum(" 1.50 ", "2").unwrap(), "3.50");
    }

    #[test]
    fn test_sum_overflow_is_an_error() {
        let max = "79228162514264337593543950335";
        assert!(matches!(
            sum(max, "1"),
            Err(ReconError::InvalidAmount(v)) if v == format!("{max} + 1")
        ));
        assert!(sum(&format!("-{max}"), "-1").is_err());
    }

    #[test]
    fn test_sum_rejects_non_numeric() {
        assert!(matches!(sum("abc", "1.00"), Err(ReconError::InvalidAmount(v)) if v == "abc"));
        assert!(matches!(sum("3.t", "-3.617"), Err(ReconError::InvalidAmount(_))));
        assert!(matches!(sum("1.00", ""), Err(ReconError::InvalidAmount(v)) if v.is_empty()));
    }
}
