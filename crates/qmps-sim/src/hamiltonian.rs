//! Hamiltonian data structures.
//!
//! A Hamiltonian is a sum of weighted Pauli strings:
//!
//!   H = Σ_k  c_k · P_k
//!
//! where each P_k is a tensor product of single-qubit Pauli operators
//! (I, X, Y, Z) and c_k ∈ ℝ.
//!
//! Dense matrices produced by [`Hamiltonian::to_matrix`] order the qubits
//! with qubit 0 as the most significant bit, i.e. `P_0 ⊗ P_1 ⊗ …`. This is
//! the local ordering of [`crate::Gate::Unitary`].
//!
//! # Example
//!
//! ```rust
//! use qmps_sim::hamiltonian::Hamiltonian;
//!
//! // Transverse field on two sites: ½(X⊗I + I⊗X)
//! let h = Hamiltonian::two_site(&[("X", 1.0)]).unwrap();
//! assert_eq!(h.n_terms(), 2);
//! assert_eq!(h.min_qubits(), 2);
//! ```

use std::str::FromStr;

use ndarray::Array2;
use ndarray::linalg::kron;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::observable::Observable;
use crate::statevector::Statevector;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PauliOp {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl PauliOp {
    /// Dense 2x2 matrix.
    pub fn matrix(self) -> Array2<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let entries = match self {
            PauliOp::I => [[one, zero], [zero, one]],
            PauliOp::X => [[zero, one], [one, zero]],
            PauliOp::Y => [[zero, -i], [i, zero]],
            PauliOp::Z => [[one, zero], [zero, -one]],
        };
        ndarray::arr2(&entries)
    }
}

impl TryFrom<char> for PauliOp {
    type Error = SimError;

    fn try_from(c: char) -> SimResult<Self> {
        match c.to_ascii_uppercase() {
            'I' => Ok(PauliOp::I),
            'X' => Ok(PauliOp::X),
            'Y' => Ok(PauliOp::Y),
            'Z' => Ok(PauliOp::Z),
            _ => Err(SimError::InvalidPauliLabel(c.to_string())),
        }
    }
}

/// A tensor product of Pauli operators on named qubits.
///
/// Stored as a sorted `Vec<(qubit_index, PauliOp)>` with Identity terms
/// omitted.  Qubits not listed are implicitly I.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauliString {
    /// Non-identity terms, sorted by qubit index ascending.
    ops: Vec<(u32, PauliOp)>,
}

impl PauliString {
    /// Construct a PauliString from an iterator of (qubit, op) pairs.
    ///
    /// Identity operators are dropped; the remaining ops are sorted by qubit.
    pub fn from_ops(ops: impl IntoIterator<Item = (u32, PauliOp)>) -> Self {
        let mut v: Vec<(u32, PauliOp)> = ops
            .into_iter()
            .filter(|(_, op)| *op != PauliOp::I)
            .collect();
        v.sort_by_key(|(q, _)| *q);
        Self { ops: v }
    }

    /// Return the non-identity (qubit, op) pairs, sorted by qubit index.
    pub fn ops(&self) -> &[(u32, PauliOp)] {
        &self.ops
    }

    /// The highest qubit index referenced, or `None` for an identity string.
    pub fn max_qubit(&self) -> Option<u32> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// The operator acting on `qubit`.
    pub fn op_on(&self, qubit: u32) -> PauliOp {
        self.ops
            .iter()
            .find(|(q, _)| *q == qubit)
            .map_or(PauliOp::I, |(_, op)| *op)
    }

    /// Relabel every qubit `q` as `q + offset`.
    #[must_use]
    pub fn shifted(&self, offset: u32) -> Self {
        Self {
            ops: self.ops.iter().map(|(q, op)| (q + offset, *op)).collect(),
        }
    }
}

impl FromStr for PauliString {
    type Err = SimError;

    /// Parse a positional label such as `"ZZ"` or `"XI"`; character `k`
    /// acts on qubit `k`.
    fn from_str(label: &str) -> SimResult<Self> {
        if label.is_empty() {
            return Err(SimError::InvalidPauliLabel(label.to_string()));
        }
        let ops = label
            .chars()
            .enumerate()
            .map(|(k, c)| {
                PauliOp::try_from(c)
                    .map(|op| (k as u32, op))
                    .map_err(|_| SimError::InvalidPauliLabel(label.to_string()))
            })
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self::from_ops(ops))
    }
}

/// A single weighted Pauli term: `coeff · pauli`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HamiltonianTerm {
    /// Real coefficient.
    pub coeff: f64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl HamiltonianTerm {
    /// Create a new term.
    pub fn new(coeff: f64, pauli: PauliString) -> Self {
        Self { coeff, pauli }
    }

    /// Shorthand: single-qubit Z term.
    pub fn z(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::Z)]))
    }

    /// Shorthand: ZZ coupling term.
    pub fn zz(q0: u32, q1: u32, coeff: f64) -> Self {
        Self::new(
            coeff,
            PauliString::from_ops([(q0, PauliOp::Z), (q1, PauliOp::Z)]),
        )
    }

    /// Shorthand: single-qubit X term.
    pub fn x(qubit: u32, coeff: f64) -> Self {
        Self::new(coeff, PauliString::from_ops([(qubit, PauliOp::X)]))
    }
}

/// A sum-of-Pauli-strings Hamiltonian.
///
/// H = Σ_k  c_k · P_k
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hamiltonian {
    terms: Vec<HamiltonianTerm>,
}

impl Hamiltonian {
    /// Create from a list of terms.
    pub fn from_terms(terms: Vec<HamiltonianTerm>) -> Self {
        Self { terms }
    }

    /// Build a translation-invariant two-site Hamiltonian from labelled
    /// couplings.
    ///
    /// Two-letter labels (`"ZZ"`, `"XI"`) act on sites 0 and 1 directly.
    /// A one-letter label `"X"` with coefficient `c` is shared between the
    /// two sites as `c/2 · (X⊗I + I⊗X)`.
    pub fn two_site<S: AsRef<str>>(couplings: &[(S, f64)]) -> SimResult<Self> {
        let mut terms = Vec::with_capacity(couplings.len() * 2);
        for (label, coeff) in couplings {
            let label = label.as_ref();
            match label.chars().count() {
                1 => {
                    let op = label
                        .chars()
                        .next()
                        .map(PauliOp::try_from)
                        .ok_or_else(|| SimError::InvalidPauliLabel(label.to_string()))??;
                    for site in 0..2 {
                        terms.push(HamiltonianTerm::new(
                            coeff / 2.0,
                            PauliString::from_ops([(site, op)]),
                        ));
                    }
                }
                2 => terms.push(HamiltonianTerm::new(*coeff, label.parse()?)),
                _ => return Err(SimError::InvalidPauliLabel(label.to_string())),
            }
        }
        Ok(Self { terms })
    }

    /// All terms.
    pub fn terms(&self) -> &[HamiltonianTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    /// The minimum number of qubits required to represent this Hamiltonian.
    ///
    /// Returns 0 if the Hamiltonian is empty or purely identity.
    pub fn min_qubits(&self) -> u32 {
        self.terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .max()
            .map_or(0, |q| q + 1)
    }

    /// The same Hamiltonian acting on qubits `offset, offset + 1, …`.
    #[must_use]
    pub fn shifted(&self, offset: u32) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|t| HamiltonianTerm::new(t.coeff, t.pauli.shifted(offset)))
                .collect(),
        }
    }

    /// Dense `2^n × 2^n` matrix with qubit 0 as the most significant bit.
    pub fn to_matrix(&self, num_qubits: u32) -> SimResult<Array2<Complex64>> {
        let needed = self.min_qubits();
        if needed > num_qubits {
            return Err(SimError::HamiltonianOutOfRange {
                qubit: needed - 1,
                num_qubits,
            });
        }
        let dim = 1usize << num_qubits;
        let mut h = Array2::<Complex64>::zeros((dim, dim));
        for term in &self.terms {
            let mut product = Array2::from_diag_elem(1, Complex64::new(1.0, 0.0));
            for q in 0..num_qubits {
                product = kron(&product, &term.pauli.op_on(q).matrix());
            }
            h.scaled_add(Complex64::new(term.coeff, 0.0), &product);
        }
        Ok(h)
    }
}

impl Observable for Hamiltonian {
    fn expectation(&self, state: &Statevector) -> f64 {
        self.terms
            .iter()
            .map(|term| {
                let mut rotated = state.clone();
                for &(q, op) in term.pauli.ops() {
                    rotated.apply_pauli(q as usize, op);
                }
                term.coeff * state.inner(&rotated).re
            })
            .sum()
    }
}

/// The 4x4 SWAP matrix.
pub fn swap_matrix() -> Array2<Complex64> {
    crate::gate::Gate::Swap.matrix()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_hermitian(m: &Array2<Complex64>) -> bool {
        m.indexed_iter()
            .all(|((r, c), z)| (z - m[[c, r]].conj()).norm() < 1e-12)
    }

    #[test]
    fn test_single_letter_label_is_split() {
        let h = Hamiltonian::two_site(&[("X", 1.0)]).unwrap();
        assert_eq!(h.n_terms(), 2);
        assert!(h.terms().iter().all(|t| (t.coeff - 0.5).abs() < 1e-15));
        assert_eq!(h.terms()[0].pauli.ops(), &[(0, PauliOp::X)]);
        assert_eq!(h.terms()[1].pauli.ops(), &[(1, PauliOp::X)]);
    }

    #[test]
    fn test_two_letter_label_positional() {
        let h = Hamiltonian::two_site(&[("ZZ", -1.0), ("XI", 0.5)]).unwrap();
        assert_eq!(h.n_terms(), 2);
        assert_eq!(h.terms()[1].pauli.ops(), &[(0, PauliOp::X)]);
    }

    #[test]
    fn test_invalid_label_rejected() {
        assert!(Hamiltonian::two_site(&[("Q", 1.0)]).is_err());
        assert!(Hamiltonian::two_site(&[("XXX", 1.0)]).is_err());
        assert!("".parse::<PauliString>().is_err());
    }

    #[test]
    fn test_to_matrix_zz_diagonal() {
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::zz(0, 1, 1.0)]);
        let m = h.to_matrix(2).unwrap();
        let diag: Vec<f64> = (0..4).map(|k| m[[k, k]].re).collect();
        assert_eq!(diag, vec![1.0, -1.0, -1.0, 1.0]);
        assert!(is_hermitian(&m));
    }

    #[test]
    fn test_to_matrix_qubit_zero_is_most_significant() {
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]);
        let m = h.to_matrix(2).unwrap();
        // Z ⊗ I = diag(1, 1, -1, -1)
        assert!((m[[1, 1]].re - 1.0).abs() < 1e-15);
        assert!((m[[2, 2]].re + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_to_matrix_rejects_narrow_width() {
        let h = Hamiltonian::from_terms(vec![HamiltonianTerm::z(3, 1.0)]);
        assert!(matches!(
            h.to_matrix(2),
            Err(SimError::HamiltonianOutOfRange { .. })
        ));
    }

    #[test]
    fn test_expectation_matches_dense_matrix() {
        let h = Hamiltonian::two_site(&[("ZZ", -1.0), ("X", 0.7), ("YY", 0.3)]).unwrap();
        let mut state = Statevector::new(2);
        let circuit = {
            let mut c = crate::Circuit::with_size("prep", 2);
            c.ry(0.4, crate::QubitId(0)).unwrap();
            c.rx(1.3, crate::QubitId(1)).unwrap();
            c.cx(crate::QubitId(0), crate::QubitId(1)).unwrap();
            c
        };
        state.run(&circuit).unwrap();

        // Convert the little-endian statevector to the big-endian dense basis.
        let dense = h.to_matrix(2).unwrap();
        let amps = state.amplitudes();
        let psi: Vec<Complex64> = (0..4)
            .map(|k| amps[((k & 1) << 1) | (k >> 1)])
            .collect();
        let mut expected = Complex64::new(0.0, 0.0);
        for r in 0..4 {
            for c in 0..4 {
                expected += psi[r].conj() * dense[[r, c]] * psi[c];
            }
        }
        assert!((h.expectation(&state) - expected.re).abs() < 1e-12);
    }

    #[test]
    fn test_shifted_moves_support() {
        let h = Hamiltonian::two_site(&[("ZZ", 1.0)]).unwrap().shifted(1);
        assert_eq!(h.min_qubits(), 3);
    }
}
