//! Small float helpers usable without `libm`
//!
//! The control math only ever needs absolute value and truncation of
//! non-negative numbers, so we avoid pulling in a math library for two
//! one-liners.

/// Absolute value of an `f32`
#[inline]
pub fn fabs(x: f32) -> f32 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

/// Truncate a non-negative `f32` to a cell index
///
/// Only valid for `x >= 0`, where truncation equals floor.
#[inline]
pub fn trunc_index(x: f32) -> usize {
    x as usize
}
