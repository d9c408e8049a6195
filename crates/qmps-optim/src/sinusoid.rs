//! Closed-form fits of one-parameter trigonometric models.
//!
//! With the `exp(−iθP/2)` rotation convention, an expectation value viewed as
//! a function of one angle is `A·sin(θ + φ) + B` when the angle appears once
//! in the circuit, and contains an extra `sin 2θ` harmonic when it appears
//! twice (once in a gate and once in its adjoint).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, SQRT_2};

use serde::{Deserialize, Serialize};

use crate::angle::wrap_angle;

/// Amplitudes below this are treated as a flat landscape.
pub const FLAT_TOL: f64 = 1e-12;

/// Grid resolution used to seed [`DoubleSinusoid::argmin`].
pub const ARGMIN_GRID: usize = 64;

/// `ε(θ) = amplitude · sin(θ + phase) + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sinusoid {
    /// Non-negative amplitude `A`.
    pub amplitude: f64,
    /// Phase `φ`.
    pub phase: f64,
    /// Constant offset `B`.
    pub offset: f64,
}

impl Sinusoid {
    /// Fit from evaluations at shifts `0`, `+π/2` and `−π/2`.
    pub fn fit(e0: f64, e_plus: f64, e_minus: f64) -> Self {
        let offset = 0.5 * (e_plus + e_minus);
        let sin_part = e0 - offset;
        let cos_part = 0.5 * (e_plus - e_minus);
        Self {
            amplitude: sin_part.hypot(cos_part),
            phase: (2.0 * e0 - e_plus - e_minus).atan2(e_plus - e_minus),
            offset,
        }
    }

    /// Model value at shift `theta`.
    pub fn value(&self, theta: f64) -> f64 {
        self.amplitude * (theta + self.phase).sin() + self.offset
    }

    /// Shift that minimises the model, `−π/2 − φ` wrapped into (−π, π].
    ///
    /// A flat model has no preferred direction and returns `0`.
    pub fn argmin(&self) -> f64 {
        if self.amplitude < FLAT_TOL {
            return 0.0;
        }
        wrap_angle(-FRAC_PI_2 - self.phase)
    }

    /// Predicted minimum value, `B − A`.
    pub fn min_value(&self) -> f64 {
        self.offset - self.amplitude
    }
}

/// Evaluations at the six shifts needed by [`DoubleSinusoid::fit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleProbes {
    /// `M(0)`.
    pub zero: f64,
    /// `M(π)`.
    pub pi: f64,
    /// `M(π/2)`.
    pub half_plus: f64,
    /// `M(−π/2)`.
    pub half_minus: f64,
    /// `M(π/4)`.
    pub quarter_plus: f64,
    /// `M(−π/4)`.
    pub quarter_minus: f64,
}

impl DoubleProbes {
    /// Shifts at which the probes are taken, in field order.
    pub const SHIFTS: [f64; 6] = [0.0, PI, FRAC_PI_2, -FRAC_PI_2, FRAC_PI_4, -FRAC_PI_4];

    /// Evaluate `f` at each of [`Self::SHIFTS`].
    pub fn measure<E>(mut f: impl FnMut(f64) -> Result<f64, E>) -> Result<Self, E> {
        Ok(Self {
            zero: f(0.0)?,
            pi: f(PI)?,
            half_plus: f(FRAC_PI_2)?,
            half_minus: f(-FRAC_PI_2)?,
            quarter_plus: f(FRAC_PI_4)?,
            quarter_minus: f(-FRAC_PI_4)?,
        })
    }
}

/// `f(x) = a·sin 2x + b·cos 2x + c·sin x + d·cos x + k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoubleSinusoid {
    /// `sin 2x` coefficient.
    pub a: f64,
    /// `cos 2x` coefficient.
    pub b: f64,
    /// `sin x` coefficient.
    pub c: f64,
    /// `cos x` coefficient.
    pub d: f64,
    /// Constant term.
    pub k: f64,
}

impl DoubleSinusoid {
    /// Exact fit from six probes.
    pub fn fit(m: &DoubleProbes) -> Self {
        let sum_0_pi = m.zero + m.pi;
        let diff_0_pi = m.zero - m.pi;
        let sum_half = m.half_plus + m.half_minus;
        let diff_half = m.half_plus - m.half_minus;
        let diff_quarter = m.quarter_plus - m.quarter_minus;

        let a = (2.0 * diff_quarter - SQRT_2 * diff_half) / 4.0;
        let b = (sum_0_pi - sum_half) / 4.0;
        let c = diff_half / 2.0;
        let d = diff_0_pi / 2.0;
        Self {
            a,
            b,
            c,
            d,
            k: m.zero - b - d,
        }
    }

    /// Model value at `x`.
    pub fn value(&self, x: f64) -> f64 {
        let (s1, c1) = x.sin_cos();
        let (s2, c2) = (2.0 * x).sin_cos();
        self.a * s2 + self.b * c2 + self.c * s1 + self.d * c1 + self.k
    }

    /// Amplitude/phase form `(P, u, Q, v)` with
    /// `f(x) = P·sin(2x + u) + Q·sin(x + v) + k`.
    pub fn polar(&self) -> (f64, f64, f64, f64) {
        (
            self.a.hypot(self.b),
            self.b.atan2(self.a),
            self.c.hypot(self.d),
            self.d.atan2(self.c),
        )
    }

    /// Global minimiser over one period, wrapped into (−π, π].
    ///
    /// The model has up to two local minima, so a uniform grid picks the
    /// right basin before [`bounded_minimize`] polishes it.
    pub fn argmin(&self) -> f64 {
        let (p, _, q, _) = self.polar();
        if p < FLAT_TOL && q < FLAT_TOL {
            return 0.0;
        }
        let step = 2.0 * PI / ARGMIN_GRID as f64;
        let seed = (0..ARGMIN_GRID)
            .map(|i| -PI + step * i as f64)
            .map(|x| (x, self.value(x)))
            .fold((0.0, f64::INFINITY), |best, cur| {
                if cur.1 < best.1 { cur } else { best }
            })
            .0;
        let refined = bounded_minimize(|x| self.value(x), seed - step, seed + step, 1e-10, 500);
        let x = if refined.fx <= self.value(seed) {
            refined.x
        } else {
            seed
        };
        wrap_angle(x)
    }
}

/// Outcome of [`bounded_minimize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundedMinimum {
    /// Location of the minimum.
    pub x: f64,
    /// Function value there.
    pub fx: f64,
    /// Number of function evaluations.
    pub evaluations: usize,
    /// False if the evaluation budget ran out first.
    pub converged: bool,
}

/// Brent's method for a scalar function on `[lo, hi]`: golden-section
/// search accelerated by successive parabolic interpolation.
pub fn bounded_minimize(
    mut f: impl FnMut(f64) -> f64,
    lo: f64,
    hi: f64,
    xtol: f64,
    max_evaluations: usize,
) -> BoundedMinimum {
    let sqrt_eps = f64::EPSILON.sqrt();
    let golden = 0.5 * (3.0 - 5f64.sqrt());

    let (mut a, mut b) = if lo <= hi { (lo, hi) } else { (hi, lo) };
    let mut fulc = a + golden * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;

    let mut fx = f(xf);
    let mut evaluations = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + xtol / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        let mut take_golden = true;

        if e.abs() > tol1 {
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                take_golden = false;
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = if xm >= xf { tol1 } else { -tol1 };
                }
            }
        }

        if take_golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden * e;
        }

        let direction = if rat >= 0.0 { 1.0 } else { -1.0 };
        let x = xf + direction * rat.abs().max(tol1);
        let fu = f(x);
        evaluations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + xtol / 3.0;
        tol2 = 2.0 * tol1;

        if evaluations >= max_evaluations {
            converged = false;
            break;
        }
    }

    BoundedMinimum {
        x: xf,
        fx,
        evaluations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_single_fit_recovers_parameters() {
        let (amp, phase, off) = (1.7, 0.4, -0.3);
        let f = |t: f64| amp * (t + phase).sin() + off;
        let s = Sinusoid::fit(f(0.0), f(FRAC_PI_2), f(-FRAC_PI_2));
        assert!(approx_eq(s.amplitude, amp, 1e-12));
        assert!(approx_eq(s.phase, phase, 1e-12));
        assert!(approx_eq(s.offset, off, 1e-12));
        assert!(approx_eq(s.value(s.argmin()), off - amp, 1e-12));
    }

    #[test]
    fn test_flat_sinusoid_does_not_move() {
        let s = Sinusoid::fit(2.0, 2.0, 2.0);
        assert_eq!(s.argmin(), 0.0);
    }

    #[test]
    fn test_double_fit_exact() {
        let truth = DoubleSinusoid {
            a: 0.3,
            b: -1.1,
            c: 0.7,
            d: 0.2,
            k: 5.0,
        };
        let probes = DoubleProbes::measure::<()>(|x| Ok(truth.value(x))).unwrap();
        let fit = DoubleSinusoid::fit(&probes);
        for x in [-2.0, -0.5, 0.1, 1.3, 3.0] {
            assert!(approx_eq(fit.value(x), truth.value(x), 1e-12));
        }
    }

    #[test]
    fn test_double_argmin_beats_dense_grid() {
        let model = DoubleSinusoid {
            a: 1.0,
            b: 0.2,
            c: -0.4,
            d: 0.9,
            k: 0.0,
        };
        let x = model.argmin();
        let grid_min = (0..10_000)
            .map(|i| model.value(-PI + 2.0 * PI * i as f64 / 10_000.0))
            .fold(f64::INFINITY, f64::min);
        assert!(model.value(x) <= grid_min + 1e-9);
        assert!(x > -PI && x <= PI);
    }

    #[test]
    fn test_bounded_minimize_quadratic() {
        let m = bounded_minimize(|x| (x - 0.3).powi(2) + 1.0, -1.0, 2.0, 1e-10, 500);
        assert!(m.converged);
        assert!(approx_eq(m.x, 0.3, 1e-6));
        assert!(approx_eq(m.fx, 1.0, 1e-12));
    }

    #[test]
    fn test_bounded_minimize_respects_bounds() {
        let m = bounded_minimize(|x| x, 1.0, 2.0, 1e-8, 500);
        assert!(m.x >= 1.0 && m.x < 1.0 + 1e-4);
    }

    #[test]
    fn test_bounded_minimize_budget() {
        let m = bounded_minimize(|x| x.sin(), -3.0, 0.0, 1e-14, 3);
        assert!(!m.converged);
        assert_eq!(m.evaluations, 3);
    }
}
