//! Fixed-precision decimal / tick arithmetic.
//!
//! All prices and sizes in this crate are [`rust_decimal::Decimal`] values.
//! Equality and ordering on `Decimal` are exact, so there is no floating
//! point anywhere on the matching, pricing or balance paths.

use rust_decimal::Decimal;

/// Returns `true` if `value` lies exactly on the grid defined by `tick`,
/// i.e. `value` is an integer multiple of `tick`.
///
/// `tick` of zero is never a multiple of anything but zero itself.
pub fn is_multiple_of(value: Decimal, tick: Decimal) -> bool {
    if tick.is_zero() {
        return value.is_zero();
    }
    (value % tick).is_zero()
}

/// Rounds `value` to the nearest multiple of `tick` using banker's rounding
/// on the quotient.
///
/// The matching engine requires every admitted price/size to already lie on
/// the grid (see [`is_multiple_of`]); `quantize` exists for callers that
/// want to snap an externally-sourced value (e.g. a simulator's reference
/// price) onto the grid before submission.
pub fn quantize(value: Decimal, tick: Decimal) -> Decimal {
    if tick.is_zero() {
        return value;
    }
    let ticks = (value / tick).round();
    ticks * tick
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn multiple_of_exact_grid() {
        assert!(is_multiple_of(dec!(100.00), dec!(0.01)));
        assert!(is_multiple_of(dec!(0), dec!(0.01)));
    }

    #[test]
    fn multiple_of_off_grid() {
        assert!(!is_multiple_of(dec!(100.005), dec!(0.01)));
    }

    #[test]
    fn quantize_snaps_to_nearest_tick() {
        assert_eq!(quantize(dec!(100.004), dec!(0.01)), dec!(100.00));
        assert_eq!(quantize(dec!(100.006), dec!(0.01)), dec!(100.01));
    }

    #[test]
    fn quantize_already_on_grid_is_identity() {
        assert_eq!(quantize(dec!(110.50), dec!(0.01)), dec!(110.50));
    }
}
