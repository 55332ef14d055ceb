//! Price math
//!
//! All monetary arithmetic goes through `rust_decimal`; f64 values are
//! converted at the boundary and rounded half-away-from-zero.

pub mod derivation;
pub mod line_math;

use rust_decimal::prelude::*;

/// Monetary values round to 2 decimal places
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a monetary f64 to the nearest cent
#[inline]
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Round a monetary f64 to the nearest whole unit
#[inline]
pub fn round_unit(value: f64) -> f64 {
    to_decimal(value)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}
