//! Token amounts and the fixed-point convention.
//!
//! Amounts are raw integer units (u128) to avoid floating-point errors.
//! Percentages and ratios use 1e18 as 100%, so 1% is 1e16.

/// A raw token amount on either ledger.
pub type Amount = u128;

/// 100% in fixed-point.
pub const PCT_BASE: u128 = 1_000_000_000_000_000_000;

/// 1% in fixed-point.
pub const ONE_PERCENT: u128 = PCT_BASE / 100;

/// Confidence reported when a proposal has upstake but no downstake.
pub const CONFIDENCE_MAX: u128 = u128::MAX;

/// Compute `value * numerator / denominator`, rounding down.
///
/// Returns `None` on a zero denominator or when the result does not fit in a u128.
/// Intermediate overflow of `value * numerator` is avoided by splitting `value`
/// into quotient and remainder against the denominator; only a remainder product
/// that still overflows gives up.
pub fn mul_div_floor(value: u128, numerator: u128, denominator: u128) -> Option<u128> {
    if denominator == 0 {
        return None;
    }
    if let Some(product) = value.checked_mul(numerator) {
        return Some(product / denominator);
    }
    let whole = value / denominator;
    let rem = value % denominator;
    let high = whole.checked_mul(numerator)?;
    // rem < denominator, so rem * numerator / denominator < numerator.
    let low = rem.checked_mul(numerator)? / denominator;
    high.checked_add(low)
}
