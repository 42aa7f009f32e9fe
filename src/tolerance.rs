//! The one place where floating values are compared against exact targets.
//!
//! Every "is this zero", "is this an integer" and sign test in the crate goes through
//! these helpers so that all function kinds round the same way.

/// Absolute tolerance for comparisons against zero and integers.
pub const EPSILON: f64 = 1e-9;

/// Relative tolerance at which a continued fraction convergent is accepted.
pub const RELATIVE: f64 = 1e-6;

pub fn is_zero(x: f64) -> bool {
    x.abs() <= EPSILON
}

/// `x` equals `target` up to [`EPSILON`], scaled by the magnitude of `target` when it
/// exceeds one.
pub fn approx_eq(x: f64, target: f64) -> bool {
    (x - target).abs() <= EPSILON * target.abs().max(1.0)
}

/// The integer `x` rounds to, when `x` is that integer up to tolerance.
pub fn nearest_integer(x: f64) -> Option<f64> {
    let rounded = x.round();
    approx_eq(x, rounded).then_some(rounded)
}

pub fn is_integer(x: f64) -> bool {
    nearest_integer(x).is_some()
}

/// Sign of `x` as -1, 0 or 1, with values within [`EPSILON`] of zero counted as zero.
pub fn sign(x: f64) -> i8 {
    if is_zero(x) {
        0
    } else if x > 0.0 {
        1
    } else {
        -1
    }
}
