//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 and clamp it to the u64 range, returning 0 for non-finite or negative values.
#[must_use]
pub fn floor_f64_to_u64(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    let max = cast::<u64, f64>(u64::MAX).unwrap_or(f64::MAX);
    let clamped = value.min(max).floor();
    cast::<f64, u64>(clamped).unwrap_or(u64::MAX)
}

/// Floor a f64 and clamp it to the usize range, returning 0 for non-finite or negative values.
#[must_use]
pub fn floor_f64_to_usize(value: f64) -> usize {
    usize::try_from(floor_f64_to_u64(value)).unwrap_or(usize::MAX)
}

/// Floor a f64 and clamp it to the i64 range, returning 0 for NaN.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).floor();
    cast::<f64, i64>(clamped).unwrap_or(i64::MAX)
}

/// Convert u64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Scale a whole-number amount by a multiplier, flooring the product.
#[must_use]
pub fn scale_floor(amount: u64, multiplier: f64) -> u64 {
    floor_f64_to_u64(u64_to_f64(amount) * multiplier)
}
