//! Error types for the tensor crate.

use thiserror::Error;

/// Errors produced by tensor/unitary conversions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TensorError {
    /// A zero vector cannot be normalised into a unitary column.
    #[error("Cannot build a unitary from a zero vector")]
    ZeroVector,

    /// The input does not have orthonormal columns.
    #[error("Matrix of shape {rows}x{cols} is not an isometry (deviation {deviation:.3e})")]
    NotIsometry {
        /// Rows of the offending matrix.
        rows: usize,
        /// Columns of the offending matrix.
        cols: usize,
        /// Max-norm of `Q†Q - I`.
        deviation: f64,
    },

    /// A shape constraint was violated.
    #[error("Invalid shape: {0}")]
    Shape(String),
}

/// Result type for tensor operations.
pub type TensorResult<T> = Result<T, TensorError>;
