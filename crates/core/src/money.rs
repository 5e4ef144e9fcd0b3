//! Monetary rounding helpers.
//!
//! Money and quantities are `Decimal`. Every persisted financial figure is
//! rounded to two places, half away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for monetary values.
pub const MONEY_SCALE: u32 = 2;

/// Round a monetary value to [`MONEY_SCALE`] places (half away from zero).
///
/// Negative values are kept as-is (no clamping).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum an iterator of amounts without rounding.
///
/// A sum that overflows `Decimal` degrades to zero instead of panicking.
pub fn sum_money<I>(values: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .unwrap_or(Decimal::ZERO)
}

/// `amount * factor` without rounding; an overflowing product degrades to zero.
pub fn mul_money(amount: Decimal, factor: Decimal) -> Decimal {
    amount.checked_mul(factor).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(2.004)), dec!(2.00));
    }

    #[test]
    fn negative_values_are_not_clamped() {
        assert_eq!(round_money(dec!(-50)), dec!(-50.00));
    }

    #[test]
    fn sum_of_nothing_is_zero() {
        assert_eq!(sum_money(Vec::new()), Decimal::ZERO);
        assert_eq!(sum_money(vec![dec!(1.10), dec!(2.20)]), dec!(3.30));
    }

    #[test]
    fn overflow_degrades_to_zero() {
        assert_eq!(mul_money(Decimal::MAX, dec!(10)), Decimal::ZERO);
        assert_eq!(sum_money(vec![Decimal::MAX, Decimal::MAX]), Decimal::ZERO);
        assert_eq!(mul_money(dec!(2.5), dec!(4)), dec!(10.0));
    }

    proptest! {
        /// Rounding is idempotent.
        #[test]
        fn rounding_twice_changes_nothing(cents in -10_000_000i64..10_000_000i64, extra in 0u32..1000) {
            let value = Decimal::new(cents, 2) + Decimal::new(extra as i64, 5);
            let once = round_money(value);
            prop_assert_eq!(round_money(once), once);
        }
    }
}
