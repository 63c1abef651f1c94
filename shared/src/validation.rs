//! Pure validation and arithmetic helpers for document totals
//!
//! Quantities and costs are decimals and are never trusted from the
//! caller: line totals and document totals are always recomputed here.

use rust_decimal::Decimal;

/// Validate that a received/approved quantity is not negative
pub fn validate_non_negative(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("value cannot be negative");
    }
    Ok(())
}

/// Validate that an issued/requested quantity is strictly positive
pub fn validate_positive(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("value must be positive");
    }
    Ok(())
}

/// Line total is always quantity x unit cost
pub fn line_total(qty: Decimal, unit_cost: Decimal) -> Decimal {
    qty * unit_cost
}

/// Document subtotal over `(qty, unit_cost)` pairs
pub fn sub_total<'a, I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = &'a (Decimal, Decimal)>,
{
    lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (qty, cost)| acc + qty * cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(dec("0.001")).is_ok());
        assert!(validate_non_negative(dec("-0.001")).is_err());
    }

    #[test]
    fn positive_rejects_zero() {
        assert!(validate_positive(Decimal::ZERO).is_err());
        assert!(validate_positive(dec("1")).is_ok());
    }

    #[test]
    fn line_total_is_qty_times_cost() {
        assert_eq!(line_total(dec("50"), dec("10")), dec("500"));
        assert_eq!(line_total(dec("2.5"), dec("4.20")), dec("10.500"));
    }

    #[test]
    fn sub_total_sums_line_totals() {
        let lines = vec![(dec("50"), dec("10")), (dec("3"), dec("7.50"))];
        assert_eq!(sub_total(&lines), dec("522.50"));
    }

    #[test]
    fn sub_total_of_no_lines_is_zero() {
        let lines: Vec<(Decimal, Decimal)> = vec![];
        assert_eq!(sub_total(&lines), Decimal::ZERO);
    }
}
