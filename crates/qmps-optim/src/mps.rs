//! Circuits and objectives for a translation-invariant MPS of bond
//! dimension 2 prepared by two-qubit gates.
//!
//! The state is parameterised by two general two-qubit gates: the state
//! gate `U` (first [`GATE_PARAMETERS`] entries) and the environment gate `V`
//! (remaining entries). One time step replaces `(U, V)` with new gates that
//! maximise the overlap with `exp(−iH·dt/2)` applied to the old state while
//! keeping the left and right reduced states consistent.

use ndarray::{Array2, Array3};
use num_complex::Complex64;
use qmps_sim::expm::evolution_operator;
use qmps_sim::{
    Circuit, Hamiltonian, HamiltonianTerm, Projector, QubitId, Statevector, SwapOperator,
};
use qmps_tensor::unitary_to_tensor;
use tracing::debug;

use crate::error::{OptimError, OptimResult};
use crate::objective::{ExpectationObjective, Objective, PurityTerms, check_parameters, expectation};

/// Angles in one general two-qubit gate.
pub const GATE_PARAMETERS: usize = 15;

/// Angles in a `(U, V)` pair.
pub const MPS_PARAMETERS: usize = 2 * GATE_PARAMETERS;

/// Append the 15-angle two-qubit gate on `(a, b)`.
///
/// Layout: `Rz·Rx·Rz` Euler rotations on each qubit, the `Rxx·Ryy·Rzz`
/// entangling block, then another Euler rotation on each qubit.
pub fn append_su4(circuit: &mut Circuit, params: &[f64], a: QubitId, b: QubitId) -> OptimResult<()> {
    if params.len() != GATE_PARAMETERS {
        return Err(OptimError::ParameterCount {
            expected: GATE_PARAMETERS,
            got: params.len(),
        });
    }
    let p = params;
    circuit.rz(p[0], a)?.rx(p[1], a)?.rz(p[2], a)?;
    circuit.rz(p[3], b)?.rx(p[4], b)?.rz(p[5], b)?;
    circuit.rxx(p[6], a, b)?.ryy(p[7], a, b)?.rzz(p[8], a, b)?;
    circuit.rz(p[9], a)?.rx(p[10], a)?.rz(p[11], a)?;
    circuit.rz(p[12], b)?.rx(p[13], b)?.rz(p[14], b)?;
    Ok(())
}

/// The 15-angle gate on `(a, b)` as a standalone circuit just wide enough
/// to hold both qubits.
pub fn su4_gate(params: &[f64], a: QubitId, b: QubitId) -> OptimResult<Circuit> {
    let mut circuit = Circuit::with_size("su4", a.0.max(b.0) + 1);
    append_su4(&mut circuit, params, a, b)?;
    Ok(circuit)
}

fn append_su4_dagger(
    circuit: &mut Circuit,
    params: &[f64],
    a: QubitId,
    b: QubitId,
) -> OptimResult<()> {
    circuit.append(&su4_gate(params, a, b)?.inverse())?;
    Ok(())
}

/// Dense 4×4 matrix of the 15-angle gate, first qubit as the most
/// significant local bit.
pub fn gate_unitary(params: &[f64]) -> OptimResult<Array2<Complex64>> {
    let circuit = su4_gate(params, QubitId(0), QubitId(1))?;
    // local index 2·b0 + b1 ↔ statevector index b0 + 2·b1
    let swap_bits = |k: usize| ((k & 1) << 1) | (k >> 1);
    let mut u = Array2::zeros((4, 4));
    for col in 0..4 {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 4];
        amplitudes[swap_bits(col)] = Complex64::new(1.0, 0.0);
        let mut state = Statevector::from_amplitudes(amplitudes)?;
        state.run(&circuit)?;
        for row in 0..4 {
            u[[row, col]] = state.amplitudes()[swap_bits(row)];
        }
    }
    Ok(u)
}

/// The left-canonical MPS tensor `A[σ, i, j]` generated by the state gate.
pub fn state_tensor(params: &[f64]) -> OptimResult<Array3<Complex64>> {
    let (u, _) = split_params(params)?;
    Ok(unitary_to_tensor(&gate_unitary(u)?)?)
}

/// Split a 30-angle vector into `(u, v)`.
pub fn split_params(params: &[f64]) -> OptimResult<(&[f64], &[f64])> {
    if params.len() != MPS_PARAMETERS {
        return Err(OptimError::ParameterCount {
            expected: MPS_PARAMETERS,
            got: params.len(),
        });
    }
    Ok(params.split_at(GATE_PARAMETERS))
}

/// Three physical sites plus environment: `V` on (2,3), then `U` on (1,2)
/// and (0,1).
pub fn state_circuit(params: &[f64]) -> OptimResult<Circuit> {
    let (u, v) = split_params(params)?;
    let mut c = Circuit::with_size("mps_state", 4);
    append_su4(&mut c, v, QubitId(2), QubitId(3))?;
    append_su4(&mut c, u, QubitId(1), QubitId(2))?;
    append_su4(&mut c, u, QubitId(0), QubitId(1))?;
    Ok(c)
}

/// Old state, two-site propagator on (1,2), then the new state undone.
///
/// The probability of returning to `|0000⟩` is the overlap between the
/// evolved old state and the new one.
pub fn evolution_circuit(
    old: &[f64],
    propagator: &Array2<Complex64>,
    params: &[f64],
) -> OptimResult<Circuit> {
    let (u_old, v_old) = split_params(old)?;
    let (u, v) = split_params(params)?;
    let mut c = Circuit::with_size("mps_evolution", 4);
    append_su4(&mut c, v_old, QubitId(2), QubitId(3))?;
    append_su4(&mut c, u_old, QubitId(1), QubitId(2))?;
    append_su4(&mut c, u_old, QubitId(0), QubitId(1))?;
    c.unitary(propagator.clone(), QubitId(1), QubitId(2))?;
    append_su4_dagger(&mut c, u, QubitId(0), QubitId(1))?;
    append_su4_dagger(&mut c, u, QubitId(1), QubitId(2))?;
    append_su4_dagger(&mut c, v, QubitId(2), QubitId(3))?;
    Ok(c)
}

/// Two copies of the `V` environment, swap test on qubits (1,2).
pub fn v_purity_circuit(params: &[f64]) -> OptimResult<Circuit> {
    let (_, v) = split_params(params)?;
    let mut c = Circuit::with_size("v_purity", 4);
    append_su4(&mut c, v, QubitId(0), QubitId(1))?;
    append_su4(&mut c, v, QubitId(2), QubitId(3))?;
    c.swap(QubitId(0), QubitId(1))?;
    Ok(c)
}

/// Two copies of the `U·V` reduced state, swap test on qubits (2,3).
pub fn u_purity_circuit(params: &[f64]) -> OptimResult<Circuit> {
    let (u, v) = split_params(params)?;
    let mut c = Circuit::with_size("u_purity", 6);
    append_su4(&mut c, v, QubitId(1), QubitId(2))?;
    append_su4(&mut c, u, QubitId(0), QubitId(1))?;
    append_su4(&mut c, v, QubitId(4), QubitId(5))?;
    append_su4(&mut c, u, QubitId(3), QubitId(4))?;
    c.swap(QubitId(0), QubitId(1))?;
    c.swap(QubitId(1), QubitId(2))?;
    Ok(c)
}

/// One `U·V` copy beside one `V` copy, swap test on qubits (1,2).
pub fn uv_purity_circuit(params: &[f64]) -> OptimResult<Circuit> {
    let (u, v) = split_params(params)?;
    let mut c = Circuit::with_size("uv_purity", 5);
    append_su4(&mut c, v, QubitId(3), QubitId(4))?;
    append_su4(&mut c, u, QubitId(2), QubitId(3))?;
    append_su4(&mut c, v, QubitId(0), QubitId(1))?;
    c.swap(QubitId(0), QubitId(1))?;
    Ok(c)
}

/// The three swap-test purities `(u, v, uv)` at `params`.
pub fn purities(params: &[f64]) -> OptimResult<(f64, f64, f64)> {
    let u = expectation(&u_purity_circuit(params)?, &SwapOperator::new(2, 3));
    let v = expectation(&v_purity_circuit(params)?, &SwapOperator::new(1, 2));
    let uv = expectation(&uv_purity_circuit(params)?, &SwapOperator::new(1, 2));
    Ok((u, v, uv))
}

/// `⟨½·Z⟩` on site 1 of the state circuit.
pub fn magnetisation(params: &[f64]) -> OptimResult<f64> {
    let z = Hamiltonian::from_terms(vec![HamiltonianTerm::z(1, 0.5)]);
    Ok(expectation(&state_circuit(params)?, &z))
}

/// Energy of `h` (a two-site Hamiltonian) on sites 1-2 of the MPS.
pub fn state_energy(
    h: &Hamiltonian,
) -> ExpectationObjective<fn(&[f64]) -> OptimResult<Circuit>, Hamiltonian> {
    ExpectationObjective::new(
        state_circuit as fn(&[f64]) -> OptimResult<Circuit>,
        h.shifted(1),
    )
    .with_num_parameters(MPS_PARAMETERS)
}

/// Half-step two-site propagator `exp(−iH·dt/2)` in the local gate basis.
pub fn half_step_propagator(h: &Hamiltonian, dt: f64) -> OptimResult<Array2<Complex64>> {
    let matrix = h.to_matrix(2)?;
    Ok(evolution_operator(&matrix, dt / 2.0)?)
}

/// One time step of MPS evolution as a minimisation problem.
///
/// Cost is `−|⟨0000|·⟩|²` of [`evolution_circuit`] plus
/// `weight · (u + v − 2·uv)` from [`purities`].
#[derive(Debug, Clone)]
pub struct EvolutionObjective {
    old: Vec<f64>,
    propagator: Array2<Complex64>,
    weight: f64,
}

impl EvolutionObjective {
    /// Objective for evolving `old` by `dt` under `h`.
    pub fn new(old: &[f64], h: &Hamiltonian, dt: f64, weight: f64) -> OptimResult<Self> {
        check_parameters(Some(MPS_PARAMETERS), old)?;
        if !dt.is_finite() {
            return Err(OptimError::InvalidConfig(format!("time step {dt} is not finite")));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(OptimError::InvalidConfig(format!(
                "regulariser weight must be finite and non-negative, got {weight}"
            )));
        }
        let propagator = half_step_propagator(h, dt)?;
        debug!(dt, weight, terms = h.n_terms(), "built evolution objective");
        Ok(Self {
            old: old.to_vec(),
            propagator,
            weight,
        })
    }

    /// Parameters of the state being evolved.
    pub fn old_params(&self) -> &[f64] {
        &self.old
    }

    /// Regulariser weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl Objective for EvolutionObjective {
    type Observation = PurityTerms;

    fn num_parameters(&self) -> Option<usize> {
        Some(MPS_PARAMETERS)
    }

    fn observe(&self, params: &[f64]) -> OptimResult<PurityTerms> {
        let overlap = Projector::zero().with_weight(-1.0);
        let energy = expectation(&evolution_circuit(&self.old, &self.propagator, params)?, &overlap);
        let (u_purity, v_purity, uv_purity) = purities(params)?;
        Ok(PurityTerms {
            energy,
            u_purity,
            v_purity,
            uv_purity,
            weight: self.weight,
        })
    }
}
