//! Fixed-point helpers on top of `rust_decimal`.
//!
//! Everything in the crate is base-10 `Decimal`. These helpers cover the
//! integrality and divisibility checks the validator needs, and the entry
//! points that turn untrusted numeric input into a `Decimal`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::validation::ValidationError;

/// True when `value` has no fractional part.
pub fn is_integer(value: Decimal) -> bool {
    value.fract().is_zero()
}

/// True when `value` is a whole multiple of `step`. A zero step never divides.
pub fn is_multiple_of(value: Decimal, step: Decimal) -> bool {
    match value.checked_rem(step) {
        Some(rem) => rem.is_zero(),
        None => false,
    }
}

/// `a * b` when the product is representable exactly, `None` otherwise.
///
/// `checked_mul` only fails on overflow: a product needing more than 28
/// decimal places, or more than 96 bits of mantissa, is silently rounded.
/// Rounding always lowers the result scale below the sum of the input
/// scales, which is what gets checked here.
pub fn checked_mul_exact(a: Decimal, b: Decimal) -> Option<Decimal> {
    let (a, b) = (a.normalize(), b.normalize());
    let product = a.checked_mul(b)?;
    (product.scale() == a.scale() + b.scale()).then_some(product)
}

/// `floor(numerator / denominator)`, `None` on a zero denominator or overflow.
///
/// Divides the exact multiple left after taking the remainder off, so a
/// quotient just under an integer never rounds up onto it.
pub fn floor_div(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    let rem = numerator.checked_rem(denominator)?;
    let truncated = numerator.checked_sub(rem)?.checked_div(denominator)?.trunc();
    // remainder takes the sign of the numerator, so truncation rounded up
    if !rem.is_zero() && (rem < Decimal::ZERO) != (denominator < Decimal::ZERO) {
        truncated.checked_sub(Decimal::ONE)
    } else {
        Some(truncated)
    }
}

/// Truncates toward zero at `dp` decimal places.
pub fn truncate_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Parses a decimal string exactly. Anything that does not fit the
/// fixed-point range, or would need rounding, is rejected for `field`.
pub fn parse(field: &'static str, raw: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str_exact(raw.trim())
        .map_err(|e| ValidationError::new(field, format!("{field} is not a valid decimal: {e}")))
}

/// Converts a binary float into a `Decimal`. NaN and infinities are rejected.
pub fn from_f64(field: &'static str, raw: f64) -> Result<Decimal, ValidationError> {
    if !raw.is_finite() {
        return Err(ValidationError::new(field, format!("{field} must be finite")));
    }
    Decimal::from_f64(raw)
        .ok_or_else(|| ValidationError::new(field, format!("{field} is out of range")))
}
