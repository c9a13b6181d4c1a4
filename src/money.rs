//! Yen amounts as exact decimals.
//!
//! Every monetary figure in the crate is a [`Decimal`]. Binary floats never
//! touch money: parsing goes string → `Decimal` directly.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// A money amount in yen. Fractions are carried until presentation.
pub type Yen = Decimal;

/// Round half-up to whole yen.
///
/// Amounts handled here are non-negative in practice; for negatives this
/// rounds away from zero, which is the symmetric half-up rule.
pub fn round_yen(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a user-entered amount such as `"1,200,000"` or `" 3000 "`.
///
/// Empty input is zero. Returns `None` when the text is not a number.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Lenient form-field parse: anything unparsable counts as zero.
pub fn parse_amount_or_zero(input: &str) -> Decimal {
    parse_amount(input).unwrap_or(Decimal::ZERO)
}

/// Format as `¥1,234,567` after rounding to whole yen.
pub fn format_yen(amount: Decimal) -> String {
    let rounded = round_yen(amount);
    let digits = rounded.abs().trunc().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-¥{grouped}")
    } else {
        format!("¥{grouped}")
    }
}

/// Trim trailing zeros from a quantity for display (e.g. `0.50000000` → `0.5`).
pub fn format_quantity(qty: Decimal) -> String {
    qty.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_yen(dec!(0.5)), dec!(1));
        assert_eq!(round_yen(dec!(1.4999)), dec!(1));
        assert_eq!(round_yen(dec!(7685.5)), dec!(7686));
        assert_eq!(round_yen(dec!(2.5)), dec!(3));
    }

    #[test]
    fn repeated_addition_does_not_drift() {
        let total: Decimal = (0..1000).map(|_| dec!(0.1)).sum();
        assert_eq!(total, dec!(100));
    }

    #[test]
    fn parse_amount_strips_separators() {
        assert_eq!(parse_amount("1,200,000"), Some(dec!(1200000)));
        assert_eq!(parse_amount(" 3000 "), Some(dec!(3000)));
        assert_eq!(parse_amount(""), Some(Decimal::ZERO));
        assert_eq!(parse_amount("0.007"), Some(dec!(0.007)));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount_or_zero("12x"), Decimal::ZERO);
    }

    #[test]
    fn format_yen_groups_thousands() {
        assert_eq!(format_yen(dec!(0)), "¥0");
        assert_eq!(format_yen(dec!(999)), "¥999");
        assert_eq!(format_yen(dec!(1000)), "¥1,000");
        assert_eq!(format_yen(dec!(4520000)), "¥4,520,000");
        assert_eq!(format_yen(dec!(-250000.4)), "-¥250,000");
    }

    #[test]
    fn format_quantity_trims() {
        assert_eq!(format_quantity(dec!(0.50000000)), "0.5");
        assert_eq!(format_quantity(dec!(2)), "2");
    }
}
