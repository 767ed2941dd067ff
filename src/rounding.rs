//! Money rounding.
//!
//! Rounding works on the exact binary value of the `f64`, not on its
//! shortest decimal rendering, and breaks exact midpoints away from
//! zero.  `10.005` is stored as `10.00500000000000078...` and therefore
//! rounds to `10.01`, while `1.005` is stored as `1.00499999...` and
//! rounds to `1.0`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round `value` to `decimals` places.  Non-finite values, and values
/// too large for a [`Decimal`], are returned unchanged.
pub fn round_money(value: f64, decimals: u32) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return value;
    };
    // `Decimal::to_f64` is not correctly rounded for large magnitudes;
    // parsing the decimal text is.
    exact
        .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_binary_value_not_literal() {
        assert_eq!(round_money(10.005, 2), 10.01);
        assert_eq!(round_money(1.005, 2), 1.0);
        assert_eq!(round_money(2.675, 2), 2.67);
    }

    #[test]
    fn test_exact_midpoint_rounds_away_from_zero() {
        assert_eq!(round_money(0.125, 2), 0.13);
        assert_eq!(round_money(-0.125, 2), -0.13);
        assert_eq!(round_money(2.5, 0), 3.0);
    }

    #[test]
    fn test_large_values_land_on_nearest_double() {
        assert_eq!(round_money(4.087133681212667e14, 2), 408713368121266.7);
        assert_eq!(round_money(3.14e12, 2), 3.14e12);
        assert_eq!(round_money(-4.087133681212667e14, 2), -408713368121266.7);
    }

    #[test]
    fn test_non_finite_passes_through() {
        assert!(round_money(f64::NAN, 2).is_nan());
        assert_eq!(round_money(f64::INFINITY, 2), f64::INFINITY);
    }
}
