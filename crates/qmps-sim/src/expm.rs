//! Matrix exponential via scaling-and-squaring with a truncated Taylor series.
//!
//! Only small matrices appear here (two-site propagators, 4x4), so the series
//! is evaluated directly after scaling the 1-norm below [`SCALING_THRESHOLD`].

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

/// Matrices are scaled by `2^-s` until their 1-norm is at most this value.
const SCALING_THRESHOLD: f64 = 0.5;

/// Upper bound on Taylor terms; with ‖A‖₁ ≤ 0.5 the series has converged to
/// machine precision well before this.
const MAX_TAYLOR_TERMS: usize = 30;

/// Compute the matrix exponential exp(A).
pub fn matrix_exp(a: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
    let (n, m) = a.dim();
    if n != m {
        return Err(SimError::MatrixShape {
            expected: n,
            rows: n,
            cols: m,
        });
    }
    if n == 0 {
        return Ok(Array2::zeros((0, 0)));
    }

    let norm = matrix_1_norm(a);
    let s = if norm > SCALING_THRESHOLD {
        (norm / SCALING_THRESHOLD).log2().ceil() as i32
    } else {
        0
    };
    let scaled = a.mapv(|z| z * 2f64.powi(-s));

    // exp(A_s) = Σ A_s^k / k!
    let eye = Array2::from_diag_elem(n, Complex64::new(1.0, 0.0));
    let mut result = eye.clone();
    let mut term = eye;
    for k in 1..=MAX_TAYLOR_TERMS {
        term = term.dot(&scaled).mapv(|z| z / k as f64);
        result += &term;
        if matrix_1_norm(&term) <= f64::EPSILON * matrix_1_norm(&result) {
            break;
        }
    }

    // exp(A) = (exp(A/2^s))^(2^s)
    for _ in 0..s {
        result = result.dot(&result);
    }
    Ok(result)
}

/// The propagator `exp(-i · h · t)` of a Hermitian matrix `h`.
pub fn evolution_operator(h: &Array2<Complex64>, t: f64) -> SimResult<Array2<Complex64>> {
    let generator = h.mapv(|z| z * Complex64::new(0.0, -t));
    matrix_exp(&generator)
}

/// Compute the 1-norm of a complex matrix: max column sum of absolute values.
fn matrix_1_norm(a: &Array2<Complex64>) -> f64 {
    a.columns()
        .into_iter()
        .map(|col| col.iter().map(|z| z.norm()).sum::<f64>())
        .fold(0.0, f64::max)
}
