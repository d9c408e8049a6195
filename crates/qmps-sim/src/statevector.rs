//! Statevector simulation engine.

use ndarray::Array2;
use num_complex::Complex64;
use rand::Rng;
use tracing::trace;

use crate::circuit::{Circuit, Instruction, QubitId};
use crate::error::{SimError, SimResult};
use crate::gate::Gate;
use crate::hamiltonian::PauliOp;

/// A statevector representing a pure quantum state.
///
/// Qubit `q` is bit `q` of the amplitude index (little-endian).
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Wrap an explicit amplitude vector. The length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> SimResult<Self> {
        let len = amplitudes.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(SimError::InvalidDimension(len));
        }
        Ok(Self {
            num_qubits: len.trailing_zeros() as usize,
            amplitudes,
        })
    }

    /// Simulate `circuit` starting from |0...0⟩.
    pub fn simulate(circuit: &Circuit) -> Self {
        let mut state = Self::new(circuit.num_qubits() as usize);
        for inst in circuit.instructions() {
            state.apply(inst);
        }
        trace!(
            circuit = circuit.name(),
            ops = circuit.num_ops(),
            "simulated circuit"
        );
        state
    }

    /// Apply every instruction of `circuit` to this state.
    pub fn run(&mut self, circuit: &Circuit) -> SimResult<()> {
        if circuit.num_qubits() as usize != self.num_qubits {
            return Err(SimError::WidthMismatch {
                circuit: circuit.name().to_string(),
                circuit_qubits: circuit.num_qubits(),
                state_qubits: self.num_qubits as u32,
            });
        }
        for inst in circuit.instructions() {
            self.apply(inst);
        }
        Ok(())
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of the computational basis state `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.amplitudes.get(index).map_or(0.0, |a| a.norm_sqr())
    }

    /// Squared norm of the state.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Inner product ⟨self|other⟩.
    pub fn inner(&self, other: &Statevector) -> Complex64 {
        self.amplitudes
            .iter()
            .zip(&other.amplitudes)
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// Apply one instruction.
    ///
    /// Operands are trusted; [`Circuit::apply`] validates them.
    pub fn apply(&mut self, instruction: &Instruction) {
        let bit = |q: &QubitId| 1usize << q.0;
        match (&instruction.gate, instruction.qubits.as_slice()) {
            (Gate::I, _) => {}
            (Gate::X, [q]) => self.flip(bit(q), 0),
            (Gate::CX, [control, target]) => self.flip(bit(target), bit(control)),
            (Gate::Swap, [a, b]) => self.exchange(bit(a), bit(b)),
            (gate, [q]) => self.apply_1q(bit(q), &gate.matrix()),
            (gate, [hi, lo]) => self.apply_2q(bit(hi), bit(lo), &gate.matrix()),
            _ => {}
        }
    }

    /// Apply a single Pauli operator to `qubit`.
    pub fn apply_pauli(&mut self, qubit: usize, op: PauliOp) {
        match op {
            PauliOp::I => {}
            PauliOp::X => self.flip(1 << qubit, 0),
            op => self.apply_1q(1 << qubit, &op.matrix()),
        }
    }

    // =========================================================================
    // Kernels (arguments are bit masks)
    // =========================================================================

    /// Swap the `target` pair wherever every bit of `control` is set.
    fn flip(&mut self, target: usize, control: usize) {
        for i in 0..self.amplitudes.len() {
            if i & target == 0 && i & control == control {
                self.amplitudes.swap(i, i | target);
            }
        }
    }

    fn exchange(&mut self, a: usize, b: usize) {
        for i in 0..self.amplitudes.len() {
            if i & a != 0 && i & b == 0 {
                self.amplitudes.swap(i, i ^ a ^ b);
            }
        }
    }

    fn apply_1q(&mut self, mask: usize, m: &Array2<Complex64>) {
        let (m00, m01, m10, m11) = (m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]);
        let zero = Complex64::new(0.0, 0.0);
        if m01 == zero && m10 == zero {
            for (i, amp) in self.amplitudes.iter_mut().enumerate() {
                *amp *= if i & mask == 0 { m00 } else { m11 };
            }
            return;
        }
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let (x, y) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = m00 * x + m01 * y;
                self.amplitudes[j] = m10 * x + m11 * y;
            }
        }
    }

    /// Dense 4x4 matrix; `hi` is the most significant local bit.
    fn apply_2q(&mut self, hi: usize, lo: usize, m: &Array2<Complex64>) {
        for base in 0..self.amplitudes.len() {
            if base & (hi | lo) != 0 {
                continue;
            }
            let idx = [base, base | lo, base | hi, base | hi | lo];
            let v = idx.map(|k| self.amplitudes[k]);
            for (row, &k) in idx.iter().enumerate() {
                self.amplitudes[k] = (0..4).map(|col| m[[row, col]] * v[col]).sum();
            }
        }
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// Sample a measurement outcome of all qubits.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum fractionally below 1.
        self.amplitudes.len() - 1
    }

    /// Sample the Z-basis outcome (0 or 1) of a single qubit.
    pub fn sample_qubit<R: Rng + ?Sized>(&self, qubit: QubitId, rng: &mut R) -> u8 {
        ((self.sample(rng) >> qubit.0) & 1) as u8
    }

    /// Exact Bloch vector `(⟨X⟩, ⟨Y⟩, ⟨Z⟩)` of one qubit.
    pub fn bloch_vector(&self, qubit: QubitId) -> [f64; 3] {
        let axis = |op: PauliOp| {
            let mut rotated = self.clone();
            rotated.apply_pauli(qubit.0 as usize, op);
            self.inner(&rotated).re
        };
        [axis(PauliOp::X), axis(PauliOp::Y), axis(PauliOp::Z)]
    }
}

/// Estimate the Bloch vector of `qubit` after `circuit` by sampling.
///
/// Each axis is measured `reps` times: Z directly, Y after S†·H and X after
/// H. Each component is `1 - 2·mean(outcome)`.
pub fn sampled_bloch_vector<R: Rng + ?Sized>(
    circuit: &Circuit,
    qubit: QubitId,
    reps: usize,
    rng: &mut R,
) -> SimResult<[f64; 3]> {
    let mut estimate = |basis_change: &[Gate]| -> SimResult<f64> {
        let mut measured = circuit.clone();
        for gate in basis_change {
            measured.apply(Instruction::single_qubit_gate(gate.clone(), qubit))?;
        }
        let state = Statevector::simulate(&measured);
        let ones: usize = (0..reps)
            .map(|_| state.sample_qubit(qubit, rng) as usize)
            .sum();
        Ok(1.0 - 2.0 * ones as f64 / reps.max(1) as f64)
    };
    let x = estimate(&[Gate::H])?;
    let y = estimate(&[Gate::Sdg, Gate::H])?;
    let z = estimate(&[])?;
    Ok([x, y, z])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn close(a: &Statevector, b: &Statevector) -> bool {
        a.amplitudes
            .iter()
            .zip(&b.amplitudes)
            .all(|(x, y)| (x - y).norm() < 1e-10)
    }

    fn scrambled(n: u32) -> Statevector {
        let mut c = Circuit::with_size("scramble", n);
        for q in 0..n {
            c.ry(0.3 + f64::from(q), QubitId(q)).unwrap();
            c.rz(1.1 * f64::from(q) - 0.4, QubitId(q)).unwrap();
        }
        c.cx(QubitId(0), QubitId(1)).unwrap();
        Statevector::simulate(&c)
    }

    #[test]
    fn test_bell_state() {
        let mut c = Circuit::with_size("bell", 2);
        c.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let sv = Statevector::simulate(&c);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        assert!((sv.amplitudes[0].re - half).abs() < 1e-12);
        assert!((sv.amplitudes[3].re - half).abs() < 1e-12);
        assert!(sv.probability(1) < 1e-24 && sv.probability(2) < 1e-24);
    }

    #[test]
    fn test_fast_paths_match_dense_matrices() {
        let state = scrambled(3);
        for gate in [
            Gate::Rxx(0.83),
            Gate::Ryy(-1.37),
            Gate::Rzz(2.11),
            Gate::CX,
            Gate::CZ,
            Gate::Swap,
        ] {
            let mut direct = state.clone();
            direct.apply(&Instruction::two_qubit_gate(gate.clone(), QubitId(2), QubitId(0)));
            let mut dense = state.clone();
            dense.apply_2q(1 << 2, 1, &gate.matrix());
            assert!(close(&direct, &dense), "{} disagrees with its matrix", gate.name());
        }
        for gate in [Gate::X, Gate::Z, Gate::S, Gate::Rz(0.4), Gate::H] {
            let mut direct = state.clone();
            direct.apply(&Instruction::single_qubit_gate(gate.clone(), QubitId(1)));
            let mut dense = state.clone();
            dense.apply_2q(1 << 1, 1 << 2, &kron_identity(&gate.matrix()));
            assert!(close(&direct, &dense), "{} disagrees with its matrix", gate.name());
        }
    }

    /// `m ⊗ I` in the local two-qubit ordering.
    fn kron_identity(m: &Array2<Complex64>) -> Array2<Complex64> {
        ndarray::linalg::kron(m, &Gate::I.matrix())
    }

    #[test]
    fn test_unitary_gate_orders_first_qubit_high() {
        let m = kron_identity(&Gate::X.matrix());
        let mut c = Circuit::with_size("u", 3);
        c.unitary(m, QubitId(2), QubitId(1)).unwrap();
        let sv = Statevector::simulate(&c);
        assert!((sv.probability(0b100) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_run_rejects_width_mismatch() {
        let circuit = Circuit::with_size("wide", 3);
        let mut sv = Statevector::new(2);
        assert!(matches!(
            sv.run(&circuit),
            Err(SimError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn test_from_amplitudes_requires_power_of_two() {
        let amps = vec![Complex64::new(1.0, 0.0); 3];
        assert!(Statevector::from_amplitudes(amps).is_err());
        let sv = Statevector::from_amplitudes(vec![Complex64::new(1.0, 0.0); 4]).unwrap();
        assert_eq!(sv.num_qubits(), 2);
    }

    #[test]
    fn test_basis_state_always_samples_itself() {
        let mut sv = Statevector::new(2);
        sv.apply_pauli(1, PauliOp::X);
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..100).all(|_| sv.sample(&mut rng) == 0b10));
        assert_eq!(sv.sample_qubit(QubitId(0), &mut rng), 0);
    }

    #[test]
    fn test_bloch_vector_of_plus_state() {
        let mut sv = Statevector::new(1);
        sv.apply(&Instruction::single_qubit_gate(Gate::H, QubitId(0)));
        let [x, y, z] = sv.bloch_vector(QubitId(0));
        assert!((x - 1.0).abs() < 1e-12);
        assert!(y.abs() < 1e-12);
        assert!(z.abs() < 1e-12);
    }

    #[test]
    fn test_pauli_y_phases() {
        let mut sv = Statevector::new(1);
        sv.apply_pauli(0, PauliOp::Y);
        assert!((sv.amplitudes[1] - Complex64::new(0.0, 1.0)).norm() < 1e-12);
    }
}
