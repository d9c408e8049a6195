//! Hermitian observables evaluated on statevectors.

use serde::{Deserialize, Serialize};

use crate::circuit::QubitId;
use crate::statevector::Statevector;

/// A Hermitian operator with a real expectation value.
pub trait Observable {
    /// `Re ⟨ψ|O|ψ⟩`.
    fn expectation(&self, state: &Statevector) -> f64;
}

impl<T: Observable + ?Sized> Observable for &T {
    fn expectation(&self, state: &Statevector) -> f64 {
        (**self).expectation(state)
    }
}

/// `weight · |k⟩⟨k|` for a computational basis state `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projector {
    /// Basis state index (little-endian).
    pub index: usize,
    /// Scalar prefactor.
    pub weight: f64,
}

impl Projector {
    /// Projector onto |0…0⟩.
    pub fn zero() -> Self {
        Self {
            index: 0,
            weight: 1.0,
        }
    }

    /// Rescale the projector.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Observable for Projector {
    fn expectation(&self, state: &Statevector) -> f64 {
        self.weight * state.probability(self.index)
    }
}

/// SWAP between two qubits. On two copies of a state its expectation is the
/// overlap `Tr(ρ_a ρ_b)`, i.e. the purity when both halves are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOperator {
    /// First qubit.
    pub a: QubitId,
    /// Second qubit.
    pub b: QubitId,
}

impl SwapOperator {
    /// SWAP on `(a, b)`.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            a: QubitId(a),
            b: QubitId(b),
        }
    }
}

impl Observable for SwapOperator {
    fn expectation(&self, state: &Statevector) -> f64 {
        let ma = 1usize << self.a.0;
        let mb = 1usize << self.b.0;
        state
            .amplitudes()
            .iter()
            .enumerate()
            .map(|(i, amp)| {
                let bit_a = i & ma != 0;
                let bit_b = i & mb != 0;
                let j = if bit_a == bit_b { i } else { i ^ ma ^ mb };
                (amp.conj() * state.amplitudes()[j]).re
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Circuit;

    #[test]
    fn test_zero_projector_on_initial_state() {
        let sv = Statevector::new(3);
        assert!((Projector::zero().expectation(&sv) - 1.0).abs() < 1e-15);
        assert!((Projector::zero().with_weight(-1.0).expectation(&sv) + 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_swap_of_product_state_is_one() {
        let mut c = Circuit::with_size("product", 2);
        c.ry(0.7, QubitId(0)).unwrap();
        c.ry(0.7, QubitId(1)).unwrap();
        let sv = Statevector::simulate(&c);
        assert!((SwapOperator::new(0, 1).expectation(&sv) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_swap_of_singlet_is_minus_one() {
        let mut c = Circuit::with_size("singlet", 2);
        c.x(QubitId(0)).unwrap();
        c.x(QubitId(1)).unwrap();
        c.h(QubitId(0)).unwrap();
        c.cx(QubitId(0), QubitId(1)).unwrap();
        let sv = Statevector::simulate(&c);
        assert!((SwapOperator::new(0, 1).expectation(&sv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_swap_test_measures_purity_of_bell_half() {
        // Two Bell pairs (0,1) and (2,3); SWAP between halves 1 and 3
        // measures Tr(ρ²) of a maximally mixed qubit = 1/2.
        let mut c = Circuit::with_size("bells", 4);
        c.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        c.h(QubitId(2)).unwrap().cx(QubitId(2), QubitId(3)).unwrap();
        let sv = Statevector::simulate(&c);
        assert!((SwapOperator::new(1, 3).expectation(&sv) - 0.5).abs() < 1e-12);
    }
}
