//! `qmps-sim`: exact statevector simulation for variational MPS circuits.
//!
//! This crate is the expectation-value oracle of the qmps workspace: circuits
//! are built from parameterised rotations and dense two-qubit unitaries, run
//! on a full statevector, and measured against Hermitian observables.
//!
//! - [`Circuit`] builder with qubit validation and [`Circuit::inverse`]
//! - [`Statevector`] engine (little-endian, exact amplitudes)
//! - [`Observable`]s: Pauli [`Hamiltonian`]s, basis [`Projector`]s and the
//!   [`SwapOperator`] used for swap-test purities
//! - [`expm::evolution_operator`] for two-site propagators
//!
//! # Example
//!
//! ```rust
//! use qmps_sim::{Circuit, Observable, QubitId, Statevector, SwapOperator};
//!
//! // Two identical product states: the swap test returns 1.
//! let mut circuit = Circuit::with_size("copies", 2);
//! circuit.ry(0.4, QubitId(0)).unwrap();
//! circuit.ry(0.4, QubitId(1)).unwrap();
//!
//! let state = Statevector::simulate(&circuit);
//! let overlap = SwapOperator::new(0, 1).expectation(&state);
//! assert!((overlap - 1.0).abs() < 1e-12);
//! ```

pub mod circuit;
pub mod error;
pub mod expm;
pub mod gate;
pub mod hamiltonian;
pub mod observable;
pub mod statevector;

pub use circuit::{Circuit, Instruction, QubitId};
pub use error::{SimError, SimResult};
pub use gate::Gate;
pub use hamiltonian::{Hamiltonian, HamiltonianTerm, PauliOp, PauliString};
pub use observable::{Observable, Projector, SwapOperator};
pub use statevector::{Statevector, sampled_bloch_vector};
