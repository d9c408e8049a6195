//! Angle normalisation.

use std::f64::consts::PI;

/// Map `x` onto the principal branch (−π, π].
///
/// Computed as `atan2(sin x, cos x)`, so multiples of 2π collapse onto the
/// same representative. The lower endpoint −π is folded up to π.
#[inline]
pub fn wrap_angle(x: f64) -> f64 {
    let w = x.sin().atan2(x.cos());
    if w <= -PI { PI } else { w }
}
