//! Money arithmetic for event values.
//!
//! Catalog prices are carried as `f64` because the feed and the Klaviyo
//! payload are both plain numbers. Totals go through [`Decimal`] so that
//! `89.99 * 3` reports `269.97` rather than `269.96999999999997`.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Number of decimal places kept on computed totals.
const MONEY_SCALE: u32 = 2;

/// Total for `quantity` units at `unit_price`, rounded to two places.
///
/// Uses banker's rounding on the decimal product. Falls back to float
/// arithmetic for values outside `Decimal`'s range.
#[must_use]
pub fn line_total(unit_price: f64, quantity: u32) -> f64 {
    Decimal::from_f64(unit_price)
        .and_then(|price| price.checked_mul(Decimal::from(quantity)))
        .and_then(|total| total.round_dp(MONEY_SCALE).to_f64())
        .unwrap_or_else(|| (unit_price * f64::from(quantity) * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_is_exact_to_cents() {
        assert!((line_total(89.99, 3) - 269.97).abs() < f64::EPSILON);
        assert_eq!(line_total(89.99, 3).to_string(), "269.97");
    }

    #[test]
    fn test_line_total_single_unit() {
        assert_eq!(line_total(12.5, 1).to_string(), "12.5");
    }

    #[test]
    fn test_line_total_accepts_negative_price() {
        assert_eq!(line_total(-5.25, 2).to_string(), "-10.5");
    }

    #[test]
    fn test_line_total_zero_quantity() {
        assert!(line_total(19.99, 0).abs() < f64::EPSILON);
    }
}
