#![allow(clippy::new_without_default)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod diagnostics;
pub mod timing;

/// Number of bits needed to represent `n`, i.e. `floor(log2(n)) + 1` for `n > 0`.
pub fn bits_u64(n: u64) -> usize {
    (64 - n.leading_zeros()) as usize
}

/// `ceil(a / b)` for unsigned integers.
pub const fn ceil_div_usize(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}

/// Computes `ceil(log_2(n))`.
#[must_use]
pub fn log2_ceil(n: usize) -> usize {
    (usize::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Computes `log_2(n)`, panicking if `n` is not a power of two.
pub fn log2_strict(n: usize) -> usize {
    let res = n.trailing_zeros();
    assert!(n.wrapping_shr(res) == 1, "not a power of two: {n}");
    res as usize
}
