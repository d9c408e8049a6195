//! `qmps-tensor`: MPS tensor and unitary conversions.
//!
//! Bridges the tensor-network view of a translation-invariant MPS
//! (`A[σ, i, j]`, left canonical) and the gate view used by the circuit
//! simulator (a unitary whose first input qubit is prepared in `|0⟩`).

pub mod embed;
pub mod error;
pub mod linalg;

pub use embed::{
    check_embedding, environment_to_unitary, is_left_canonical, isometry_of, tensor_to_unitary,
    unitary_extension, unitary_to_tensor,
};
pub use error::{TensorError, TensorResult};
pub use linalg::{dagger, direct_sum, eye_like, null_space, orthogonal_complement};
