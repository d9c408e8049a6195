//! Conversions between MPS tensors and the unitaries that prepare them.
//!
//! A left-canonical tensor `A[σ, i, j]` with physical dimension `d` and bond
//! dimension `D` is an isometry `(D·d) × D` once the physical index is folded
//! into the rows (row index `i·d + σ`). Completing that isometry to a square
//! unitary gives a gate that produces the tensor when its first input is
//! fixed to `|0⟩`.

use ndarray::{Array2, Array3};
use num_complex::Complex64;
use tracing::trace;

use crate::error::{TensorError, TensorResult};
use crate::linalg::{
    allclose, dagger, direct_sum, hstack, isometry_deviation, is_unitary, orthogonal_complement,
};

/// Tolerance for isometry and unitarity checks.
pub const ISOMETRY_TOL: f64 = 1e-8;

/// Extend an isometry to a unitary.
///
/// Tall inputs (`rows > cols`, orthonormal columns) are completed with an
/// orthonormal basis of the complement of their column space. Wide inputs
/// (orthonormal rows) are completed the same way on their adjoint. When
/// `dim` exceeds the resulting size, the unitary is padded with an identity
/// block; a smaller `dim` is ignored.
pub fn unitary_extension(
    q: &Array2<Complex64>,
    dim: Option<usize>,
) -> TensorResult<Array2<Complex64>> {
    let (rows, cols) = q.dim();
    let deviation = if rows >= cols {
        isometry_deviation(q)
    } else {
        isometry_deviation(&dagger(q))
    };
    if deviation > ISOMETRY_TOL {
        return Err(TensorError::NotIsometry {
            rows,
            cols,
            deviation,
        });
    }

    let mut u = if rows > cols {
        hstack(q, &orthogonal_complement(q))?
    } else if rows < cols {
        let qd = dagger(q);
        dagger(&hstack(&qd, &orthogonal_complement(&qd))?)
    } else {
        q.clone()
    };

    if let Some(target) = dim {
        let n = u.nrows();
        if target > n {
            u = direct_sum(&u, &Array2::from_diag_elem(target - n, Complex64::new(1.0, 0.0)));
        }
    }
    trace!(rows, cols, size = u.nrows(), "extended isometry to unitary");
    Ok(u)
}

/// Unitary whose first column is `v / ‖v‖`.
pub fn environment_to_unitary(v: &Array2<Complex64>) -> TensorResult<Array2<Complex64>> {
    let flat: Vec<Complex64> = v.iter().copied().collect();
    let norm = flat.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(TensorError::ZeroVector);
    }
    let column = Array2::from_shape_fn((flat.len(), 1), |(r, _)| flat[r] / norm);
    hstack(&column, &orthogonal_complement(&column))
}

/// Fold a tensor `A[σ, i, j]` into its `(D·d) × D` matrix (row `i·d + σ`).
pub fn isometry_of(a: &Array3<Complex64>) -> Array2<Complex64> {
    let (d, rows, cols) = a.dim();
    Array2::from_shape_fn((rows * d, cols), |(r, j)| a[[r % d, r / d, j]])
}

/// True if `Σ_σ A[σ]† A[σ] = I` within [`ISOMETRY_TOL`].
pub fn is_left_canonical(a: &Array3<Complex64>) -> bool {
    isometry_deviation(&isometry_of(a)) < ISOMETRY_TOL
}

/// Build the unitary that prepares a left-canonical tensor.
pub fn tensor_to_unitary(a: &Array3<Complex64>) -> TensorResult<Array2<Complex64>> {
    let (d, rows, cols) = a.dim();
    if rows != cols {
        return Err(TensorError::Shape(format!(
            "expected square virtual bonds, got {rows}x{cols}"
        )));
    }
    let iso = isometry_of(a);
    let deviation = isometry_deviation(&iso);
    if deviation > ISOMETRY_TOL {
        return Err(TensorError::NotIsometry {
            rows: rows * d,
            cols,
            deviation,
        });
    }
    unitary_extension(&iso, None)
}

/// True if `u` is unitary and its leading columns reproduce `a`.
pub fn check_embedding(a: &Array3<Complex64>, u: &Array2<Complex64>) -> bool {
    let iso = isometry_of(a);
    if !is_unitary(u, ISOMETRY_TOL) || u.nrows() != iso.nrows() {
        return false;
    }
    let leading = u.slice(ndarray::s![.., ..iso.ncols()]).to_owned();
    allclose(&leading, &iso, ISOMETRY_TOL)
}

/// Read the tensor `A[σ, i, j] = U[2i + σ, j]` out of a qubit-physical unitary.
pub fn unitary_to_tensor(u: &Array2<Complex64>) -> TensorResult<Array3<Complex64>> {
    let (rows, cols) = u.dim();
    if rows != cols || rows < 2 || rows % 2 != 0 {
        return Err(TensorError::Shape(format!(
            "expected an even square matrix, got {rows}x{cols}"
        )));
    }
    let bond = rows / 2;
    Ok(Array3::from_shape_fn((2, bond, bond), |(s, i, j)| {
        u[[2 * i + s, j]]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    /// A(σ) = R(σ)/√2 with R(0)=I and R(1) a phase rotation; left canonical.
    fn sample_tensor() -> Array3<Complex64> {
        let r = 0.5_f64.sqrt();
        let mut a = Array3::zeros((2, 2, 2));
        a[[0, 0, 0]] = c(r, 0.0);
        a[[0, 1, 1]] = c(r, 0.0);
        a[[1, 0, 1]] = c(0.0, r);
        a[[1, 1, 0]] = c(r, 0.0);
        a
    }

    #[test]
    fn test_sample_tensor_is_left_canonical() {
        assert!(is_left_canonical(&sample_tensor()));
    }

    #[test]
    fn test_tensor_to_unitary_embeds_isometry() {
        let a = sample_tensor();
        let u = tensor_to_unitary(&a).unwrap();
        assert_eq!(u.dim(), (4, 4));
        assert!(check_embedding(&a, &u));
    }

    #[test]
    fn test_unitary_to_tensor_inverts_embedding() {
        let a = sample_tensor();
        let u = tensor_to_unitary(&a).unwrap();
        let back = unitary_to_tensor(&u).unwrap();
        assert!(a.iter().zip(back.iter()).all(|(x, y)| (x - y).norm() < 1e-12));
    }

    #[test]
    fn test_non_canonical_tensor_is_rejected() {
        let a = sample_tensor().mapv(|z| z * 2.0);
        assert!(matches!(
            tensor_to_unitary(&a),
            Err(TensorError::NotIsometry { .. })
        ));
    }

    #[test]
    fn test_environment_to_unitary_first_column() {
        let v = arr2(&[[c(1.0, 0.0), c(0.0, 1.0)], [c(0.0, 0.0), c(1.0, 0.0)]]);
        let u = environment_to_unitary(&v).unwrap();
        assert!(is_unitary(&u, 1e-10));
        let norm = 3f64.sqrt();
        assert!((u[[0, 0]] - c(1.0 / norm, 0.0)).norm() < 1e-12);
        assert!((u[[1, 0]] - c(0.0, 1.0 / norm)).norm() < 1e-12);
        assert!(u[[2, 0]].norm() < 1e-12);
    }

    #[test]
    fn test_environment_of_zero_fails() {
        let v = Array2::<Complex64>::zeros((2, 2));
        assert!(matches!(environment_to_unitary(&v), Err(TensorError::ZeroVector)));
    }

    #[test]
    fn test_wide_isometry_extension() {
        let r = 0.5_f64.sqrt();
        let q = arr2(&[[c(r, 0.0), c(r, 0.0), c(0.0, 0.0)]]);
        let u = unitary_extension(&q, None).unwrap();
        assert!(is_unitary(&u, 1e-10));
        assert!(allclose(&u.slice(ndarray::s![..1, ..]).to_owned(), &q, 1e-12));
    }

    #[test]
    fn test_extension_pads_with_identity() {
        let q = arr2(&[[c(1.0, 0.0)], [c(0.0, 0.0)]]);
        let u = unitary_extension(&q, Some(4)).unwrap();
        assert_eq!(u.dim(), (4, 4));
        assert!(is_unitary(&u, 1e-12));
        assert_eq!(u[[3, 3]], c(1.0, 0.0));
        // smaller target is a no-op
        assert_eq!(unitary_extension(&q, Some(1)).unwrap().dim(), (2, 2));
    }

    #[test]
    fn test_unitary_to_tensor_rejects_odd() {
        let u = Array2::<Complex64>::eye(3);
        assert!(unitary_to_tensor(&u).is_err());
    }
}
