//! Circuit builder API.

use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::gate::Gate;

/// Unique identifier for a qubit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A gate applied to an ordered list of qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The gate.
    pub gate: Gate,
    /// Operands; for two-qubit gates the first entry is the most significant
    /// bit of the gate's local index.
    pub qubits: Vec<QubitId>,
}

impl Instruction {
    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: Gate, qubit: QubitId) -> Self {
        Self {
            gate,
            qubits: vec![qubit],
        }
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: Gate, q0: QubitId, q1: QubitId) -> Self {
        Self {
            gate,
            qubits: vec![q0, q1],
        }
    }

    /// The inverse instruction on the same qubits.
    pub fn adjoint(&self) -> Self {
        Self {
            gate: self.gate.adjoint(),
            qubits: self.qubits.clone(),
        }
    }
}

/// A quantum circuit: a fixed-width register and an ordered gate list.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    /// Name of the circuit.
    name: String,
    /// Number of qubits.
    num_qubits: u32,
    /// Instructions in application order.
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit on `num_qubits` qubits.
    pub fn with_size(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: vec![],
        }
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of gate applications.
    pub fn num_ops(&self) -> usize {
        self.instructions.len()
    }

    /// Circuit depth: the longest chain of gates sharing a qubit.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits as usize];
        for inst in &self.instructions {
            let next = inst
                .qubits
                .iter()
                .map(|q| layer[q.0 as usize])
                .max()
                .unwrap_or(0)
                + 1;
            for q in &inst.qubits {
                layer[q.0 as usize] = next;
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// Validate and append an instruction.
    pub fn apply(&mut self, instruction: Instruction) -> SimResult<&mut Self> {
        let gate = instruction.gate.name();
        if instruction.qubits.len() != instruction.gate.num_qubits() {
            return Err(SimError::QubitCountMismatch {
                gate,
                expected: instruction.gate.num_qubits(),
                got: instruction.qubits.len(),
            });
        }
        for (k, q) in instruction.qubits.iter().enumerate() {
            if q.0 >= self.num_qubits {
                return Err(SimError::QubitOutOfRange {
                    qubit: *q,
                    num_qubits: self.num_qubits,
                    gate,
                });
            }
            if instruction.qubits[..k].contains(q) {
                return Err(SimError::DuplicateQubit { qubit: *q, gate });
            }
        }
        if let Gate::Unitary(m) = &instruction.gate {
            if m.dim() != (4, 4) {
                return Err(SimError::MatrixShape {
                    expected: 4,
                    rows: m.nrows(),
                    cols: m.ncols(),
                });
            }
        }
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append every instruction of `other`.
    pub fn append(&mut self, other: &Circuit) -> SimResult<&mut Self> {
        for inst in &other.instructions {
            self.apply(inst.clone())?;
        }
        Ok(self)
    }

    /// The inverse circuit: reversed order, every gate replaced by its adjoint.
    #[must_use]
    pub fn inverse(&self) -> Circuit {
        Circuit {
            name: format!("{}_dg", self.name),
            num_qubits: self.num_qubits,
            instructions: self.instructions.iter().rev().map(Instruction::adjoint).collect(),
        }
    }

    // =========================================================================
    // Single-qubit gates
    // =========================================================================

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::H, qubit))
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::Z, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::Sdg, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::Rx(theta), qubit))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::Ry(theta), qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::single_qubit_gate(Gate::Rz(theta), qubit))
    }

    // =========================================================================
    // Two-qubit gates
    // =========================================================================

    /// Apply CNOT (CX) gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::CX, control, target))
    }

    /// Apply CZ gate.
    pub fn cz(&mut self, q0: QubitId, q1: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::CZ, q0, q1))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q0: QubitId, q1: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::Swap, q0, q1))
    }

    /// Apply XX rotation gate.
    pub fn rxx(&mut self, theta: f64, q0: QubitId, q1: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::Rxx(theta), q0, q1))
    }

    /// Apply YY rotation gate.
    pub fn ryy(&mut self, theta: f64, q0: QubitId, q1: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::Ryy(theta), q0, q1))
    }

    /// Apply ZZ rotation gate.
    pub fn rzz(&mut self, theta: f64, q0: QubitId, q1: QubitId) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::Rzz(theta), q0, q1))
    }

    /// Apply a dense 4x4 unitary. `q0` is the most significant local bit.
    pub fn unitary(
        &mut self,
        matrix: Array2<Complex64>,
        q0: QubitId,
        q1: QubitId,
    ) -> SimResult<&mut Self> {
        self.apply(Instruction::two_qubit_gate(Gate::Unitary(matrix), q0, q1))
    }
}
