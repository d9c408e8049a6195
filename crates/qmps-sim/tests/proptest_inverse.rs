//! Property-based tests: a circuit followed by its inverse is the identity.

use proptest::prelude::*;
use qmps_sim::{Circuit, Observable, Projector, QubitId, Statevector};

/// Gate operations that can be applied to a circuit.
#[derive(Debug, Clone)]
enum GateOp {
    Rx(u32, f64),
    Ry(u32, f64),
    Rz(u32, f64),
    S(u32),
    Rxx(u32, u32, f64),
    Ryy(u32, u32, f64),
    Rzz(u32, u32, f64),
    Swap(u32, u32),
}

impl GateOp {
    fn apply(self, circuit: &mut Circuit) {
        let _ = match self {
            GateOp::Rx(q, t) => circuit.rx(t, QubitId(q)),
            GateOp::Ry(q, t) => circuit.ry(t, QubitId(q)),
            GateOp::Rz(q, t) => circuit.rz(t, QubitId(q)),
            GateOp::S(q) => circuit.s(QubitId(q)),
            GateOp::Rxx(a, b, t) => circuit.rxx(t, QubitId(a), QubitId(b)),
            GateOp::Ryy(a, b, t) => circuit.ryy(t, QubitId(a), QubitId(b)),
            GateOp::Rzz(a, b, t) => circuit.rzz(t, QubitId(a), QubitId(b)),
            GateOp::Swap(a, b) => circuit.swap(QubitId(a), QubitId(b)),
        };
    }
}

fn arb_gate_op(num_qubits: u32) -> impl Strategy<Value = GateOp> {
    let angle = -10.0_f64..10.0;
    let pair = (0..num_qubits, 0..num_qubits).prop_filter("distinct qubits", |(a, b)| a != b);
    prop_oneof![
        (0..num_qubits, angle.clone()).prop_map(|(q, t)| GateOp::Rx(q, t)),
        (0..num_qubits, angle.clone()).prop_map(|(q, t)| GateOp::Ry(q, t)),
        (0..num_qubits, angle.clone()).prop_map(|(q, t)| GateOp::Rz(q, t)),
        (0..num_qubits).prop_map(GateOp::S),
        (pair.clone(), angle.clone()).prop_map(|((a, b), t)| GateOp::Rxx(a, b, t)),
        (pair.clone(), angle.clone()).prop_map(|((a, b), t)| GateOp::Ryy(a, b, t)),
        (pair.clone(), angle).prop_map(|((a, b), t)| GateOp::Rzz(a, b, t)),
        pair.prop_map(|(a, b)| GateOp::Swap(a, b)),
    ]
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    (2_u32..=4).prop_flat_map(|num_qubits| {
        prop::collection::vec(arb_gate_op(num_qubits), 1..=20).prop_map(move |ops| {
            let mut circuit = Circuit::with_size("random", num_qubits);
            for op in ops {
                op.apply(&mut circuit);
            }
            circuit
        })
    })
}

proptest! {
    #[test]
    fn circuit_then_inverse_returns_to_zero_state(circuit in arb_circuit()) {
        let mut full = circuit.clone();
        full.append(&circuit.inverse()).unwrap();
        let state = Statevector::simulate(&full);
        prop_assert!((Projector::zero().expectation(&state) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn simulation_preserves_norm(circuit in arb_circuit()) {
        let state = Statevector::simulate(&circuit);
        prop_assert!((state.norm_sqr() - 1.0).abs() < 1e-9);
    }
}
