//! Rounding rule shared by every dose the engine emits.
//!
//! Doses are rounded to the nearest multiple of a step; exact ties go to
//! the even multiple (so 20.25 U rounds to 20.0 U, 20.75 U to 21.0 U).

/// Half-unit step used for all TDD and regimen values
pub const HALF_UNIT: f64 = 0.5;

/// Round `value` to the nearest multiple of `step`, ties to even
pub fn round_unit(value: f64, step: f64) -> f64 {
    (value / step).round_ties_even() * step
}

/// Round to the nearest half unit
pub fn round_half_unit(value: f64) -> f64 {
    round_unit(value, HALF_UNIT)
}
