//! Fixed-point angle quantization.
//!
//! Model files store angles as signed 32-bit fractions of a half turn:
//! 180° is 2³¹. Values wrap around, so 180° and -180° share the same code.

const HALF_TURN_UNITS: f64 = 2_147_483_648.0;

/// Converts degrees into the fixed-point angle unit.
///
/// The result is truncated toward zero and wrapped into the signed 32-bit
/// range.
///
/// # Examples
///
/// ```
/// use threedo_core::angle::to_papy_degree;
///
/// assert_eq!(to_papy_degree(90.0), 1 << 30);
/// assert_eq!(to_papy_degree(-45.0), -(1 << 29));
/// ```
pub fn to_papy_degree(degrees: f64) -> i64 {
    let units = (degrees * HALF_TURN_UNITS / 180.0) as i64;
    i64::from(units as i32)
}
