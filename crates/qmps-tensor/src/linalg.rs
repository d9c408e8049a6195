//! Small dense linear-algebra helpers over `Complex64`.
//!
//! Null spaces are computed by Gram–Schmidt completion against the standard
//! basis rather than an SVD. For the tiny matrices that occur in MPS gate
//! construction (at most a few dozen rows) this is exact to rounding.

use ndarray::{Array1, Array2, ArrayView1, Axis, concatenate, s};
use num_complex::Complex64;

use crate::error::{TensorError, TensorResult};

/// Vectors whose norm falls below this (relative to the largest column of
/// the input) after projection are treated as linearly dependent.
pub const RANK_TOL: f64 = 1e-10;

/// Hermitian conjugate.
pub fn dagger(a: &Array2<Complex64>) -> Array2<Complex64> {
    a.t().mapv(|z| z.conj())
}

/// Identity with the same number of rows as `a`.
pub fn eye_like(a: &Array2<Complex64>) -> Array2<Complex64> {
    Array2::from_diag_elem(a.nrows(), Complex64::new(1.0, 0.0))
}

/// Block-diagonal direct sum `a ⊕ b`.
pub fn direct_sum(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar + br, ac + bc));
    out.slice_mut(s![..ar, ..ac]).assign(a);
    out.slice_mut(s![ar.., ac..]).assign(b);
    out
}

/// `⟨a|b⟩ = Σ conj(a_i) b_i`.
pub fn inner(a: ArrayView1<Complex64>, b: ArrayView1<Complex64>) -> Complex64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
}

fn norm(v: ArrayView1<Complex64>) -> f64 {
    v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// Orthogonalise `v` against `basis` (twice, for stability) and push the
/// normalised remainder if its norm exceeds `tol`.
fn extend_basis(basis: &mut Vec<Array1<Complex64>>, mut v: Array1<Complex64>, tol: f64) -> bool {
    for _ in 0..2 {
        for b in basis.iter() {
            let overlap = inner(b.view(), v.view());
            v.scaled_add(-overlap, b);
        }
    }
    let n = norm(v.view());
    if n > tol {
        basis.push(v.mapv(|z| z / n));
        true
    } else {
        false
    }
}

fn columns_to_matrix(rows: usize, columns: &[Array1<Complex64>]) -> Array2<Complex64> {
    let mut out = Array2::zeros((rows, columns.len()));
    for (k, col) in columns.iter().enumerate() {
        out.column_mut(k).assign(col);
    }
    out
}

/// Orthonormal basis (as columns) of the orthogonal complement of the
/// column span of `a`.
pub fn orthogonal_complement(a: &Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    let scale = a.columns().into_iter().map(norm).fold(0.0, f64::max);
    let tol = RANK_TOL * scale.max(f64::MIN_POSITIVE);
    let mut basis = Vec::with_capacity(n);
    for col in a.columns() {
        extend_basis(&mut basis, col.to_owned(), tol);
    }
    let span = basis.len();
    for k in 0..n {
        if basis.len() == n {
            break;
        }
        let mut e = Array1::zeros(n);
        e[k] = Complex64::new(1.0, 0.0);
        extend_basis(&mut basis, e, RANK_TOL);
    }
    columns_to_matrix(n, &basis[span..])
}

/// Orthonormal basis (as columns) of `{x : a·x = 0}`.
pub fn null_space(a: &Array2<Complex64>) -> Array2<Complex64> {
    // ker(A) = range(A†)^⊥
    orthogonal_complement(&dagger(a))
}

/// Stack matrices side by side.
pub fn hstack(a: &Array2<Complex64>, b: &Array2<Complex64>) -> TensorResult<Array2<Complex64>> {
    concatenate(Axis(1), &[a.view(), b.view()]).map_err(|_| {
        TensorError::Shape(format!(
            "cannot place {}x{} beside {}x{}",
            a.nrows(),
            a.ncols(),
            b.nrows(),
            b.ncols()
        ))
    })
}

/// Max-norm deviation of `a†a` from the identity.
pub fn isometry_deviation(a: &Array2<Complex64>) -> f64 {
    let gram = dagger(a).dot(a);
    gram.indexed_iter()
        .map(|((r, c), z)| {
            let target = if r == c { 1.0 } else { 0.0 };
            (z - Complex64::new(target, 0.0)).norm()
        })
        .fold(0.0, f64::max)
}

/// True if `a` is square and `a†a = a a† = I` within `tol`.
pub fn is_unitary(a: &Array2<Complex64>, tol: f64) -> bool {
    a.is_square() && isometry_deviation(a) < tol && isometry_deviation(&dagger(a)) < tol
}

/// Element-wise closeness.
pub fn allclose(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() < tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_direct_sum_blocks() {
        let a = Array2::from_elem((1, 1), c(2.0, 0.0));
        let b = Array2::from_diag_elem(2, c(3.0, 0.0));
        let d = direct_sum(&a, &b);
        assert_eq!(d.dim(), (3, 3));
        assert_eq!(d[[0, 0]], c(2.0, 0.0));
        assert_eq!(d[[2, 2]], c(3.0, 0.0));
        assert_eq!(d[[0, 2]], c(0.0, 0.0));
    }

    #[test]
    fn test_null_space_of_row_vector() {
        let a = ndarray::arr2(&[[c(1.0, 0.0), c(0.0, 1.0), c(1.0, -1.0)]]);
        let n = null_space(&a);
        assert_eq!(n.dim(), (3, 2));
        assert!(a.dot(&n).iter().all(|z| z.norm() < 1e-12));
        assert!(isometry_deviation(&n) < 1e-12);
    }

    #[test]
    fn test_orthogonal_complement_of_full_rank_is_empty() {
        let eye = Array2::from_diag_elem(3, c(1.0, 0.0));
        assert_eq!(orthogonal_complement(&eye).ncols(), 0);
    }

    #[test]
    fn test_dependent_columns_are_dropped() {
        let v = ndarray::arr2(&[[c(1.0, 0.0), c(2.0, 0.0)], [c(1.0, 0.0), c(2.0, 0.0)]]);
        let comp = orthogonal_complement(&v);
        assert_eq!(comp.ncols(), 1);
        // (1, -1)/√2 up to phase
        assert!((comp[[0, 0]] + comp[[1, 0]]).norm() < 1e-12);
    }

    #[test]
    fn test_null_space_dimension_is_scale_invariant() {
        let a = ndarray::arr2(&[
            [c(1.0, 0.0), c(2.0, 0.0), c(0.0, 0.0)],
            [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0)],
        ]);
        assert_eq!(null_space(&a).ncols(), 1);
        for scale in [1e-11, 1e-6, 1e8] {
            let scaled = a.mapv(|z| z * scale);
            let n = null_space(&scaled);
            assert_eq!(n.ncols(), 1, "scale {scale}");
            let residual = scaled.dot(&n).iter().map(|z| z.norm()).fold(0.0, f64::max);
            assert!(residual < 1e-12 * scale, "scale {scale}: residual {residual}");
        }
    }

    #[test]
    fn test_is_unitary() {
        let h = ndarray::arr2(&[[c(1.0, 0.0), c(1.0, 0.0)], [c(1.0, 0.0), c(-1.0, 0.0)]])
            .mapv(|z| z / 2f64.sqrt());
        assert!(is_unitary(&h, 1e-12));
        assert!(!is_unitary(&h.mapv(|z| z * 2.0), 1e-12));
    }
}
