//! Error types for the sim crate.

use thiserror::Error;

use crate::circuit::QubitId;

/// Errors produced while building or simulating circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SimError {
    /// An instruction references a qubit outside the circuit.
    #[error("Qubit {qubit} out of range for a {num_qubits}-qubit circuit (gate: {gate})")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Width of the circuit.
        num_qubits: u32,
        /// Gate being applied.
        gate: &'static str,
    },

    /// The same qubit was passed twice to a multi-qubit gate.
    #[error("Duplicate qubit {qubit} in gate '{gate}'")]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// Gate being applied.
        gate: &'static str,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Gate being applied.
        gate: &'static str,
        /// Expected number of qubits.
        expected: usize,
        /// Number of qubits supplied.
        got: usize,
    },

    /// Statevector and circuit disagree on width.
    #[error("Circuit '{circuit}' has {circuit_qubits} qubits but the state has {state_qubits}")]
    WidthMismatch {
        /// Circuit name.
        circuit: String,
        /// Circuit width.
        circuit_qubits: u32,
        /// Statevector width.
        state_qubits: u32,
    },

    /// A dense matrix had the wrong shape.
    #[error("Expected a {expected}x{expected} matrix, got {rows}x{cols}")]
    MatrixShape {
        /// Required dimension.
        expected: usize,
        /// Actual number of rows.
        rows: usize,
        /// Actual number of columns.
        cols: usize,
    },

    /// Amplitude vector length is not a power of two.
    #[error("Amplitude vector of length {0} is not a power of two")]
    InvalidDimension(usize),

    /// Pauli label could not be parsed.
    #[error("Invalid Pauli label '{0}': expected one or two of I, X, Y, Z")]
    InvalidPauliLabel(String),

    /// A Hamiltonian term references a qubit outside the requested width.
    #[error("Hamiltonian references qubit {qubit} but only {num_qubits} qubits were requested")]
    HamiltonianOutOfRange {
        /// The offending qubit index.
        qubit: u32,
        /// Requested width.
        num_qubits: u32,
    },
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
