//! Rounding and comparison helpers shared by the calculators.
//!
//! Estimates are computed at full precision and only rounded here, at the
//! presentation boundary.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to `dp` decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::common::round_dp;
///
/// assert_eq!(round_dp(dec!(5.6644), 1), dec!(5.7));
/// assert_eq!(round_dp(dec!(2.25), 1), dec!(2.3));
/// assert_eq!(round_dp(dec!(-2.25), 1), dec!(-2.3)); // Away from zero
/// ```
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds to the nearest whole currency unit (or whole percent, ton, ...).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::common::round_whole;
///
/// assert_eq!(round_whole(dec!(283224.40)), dec!(283224));
/// assert_eq!(round_whole(dec!(0.5)), dec!(1));
/// ```
pub fn round_whole(value: Decimal) -> Decimal {
    round_dp(value, 0)
}

/// Returns the smaller of two decimal values.
pub fn min(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a < b { a } else { b }
}

/// Returns the larger of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use solar_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
