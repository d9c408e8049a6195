//! Error types for the optimiser crate.

use qmps_sim::SimError;
use qmps_tensor::TensorError;
use thiserror::Error;

/// Errors raised while building or evaluating objectives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptimError {
    /// Parameter vector has the wrong length for the objective.
    #[error("Expected {expected} parameters, got {got}")]
    ParameterCount {
        /// Length the objective requires.
        expected: usize,
        /// Length that was supplied.
        got: usize,
    },

    /// A parameter or objective value is NaN or infinite.
    #[error("Non-finite value {value} at index {index}")]
    NonFinite {
        /// Position of the offending entry.
        index: usize,
        /// The value itself.
        value: f64,
    },

    /// Optimiser settings are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Nothing to optimise.
    #[error("Parameter vector is empty")]
    EmptyParameters,

    /// Circuit construction or simulation failed.
    #[error(transparent)]
    Sim(#[from] SimError),

    /// Gate-to-tensor conversion failed.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// Result type for optimiser operations.
pub type OptimResult<T> = Result<T, OptimError>;
