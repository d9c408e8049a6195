//! Gate set understood by the simulator.
//!
//! Rotations follow the usual convention `R_P(θ) = exp(-i θ P / 2)`, so an
//! expectation value depends on each angle through `cos θ` and `sin θ` only.

use ndarray::{Array2, arr2};
use num_complex::Complex64;

/// A quantum gate with concrete (bound) parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    // Single-qubit gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// Rotation around X.
    Rx(f64),
    /// Rotation around Y.
    Ry(f64),
    /// Rotation around Z.
    Rz(f64),

    // Two-qubit gates
    /// XX rotation `exp(-i θ X⊗X / 2)`.
    Rxx(f64),
    /// YY rotation `exp(-i θ Y⊗Y / 2)`.
    Ryy(f64),
    /// ZZ rotation `exp(-i θ Z⊗Z / 2)`.
    Rzz(f64),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Arbitrary dense 4x4 unitary; the first qubit is the most significant
    /// bit of the local index.
    Unitary(Array2<Complex64>),
}

impl Gate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Gate::I => "id",
            Gate::X => "x",
            Gate::Y => "y",
            Gate::Z => "z",
            Gate::H => "h",
            Gate::S => "s",
            Gate::Sdg => "sdg",
            Gate::Rx(_) => "rx",
            Gate::Ry(_) => "ry",
            Gate::Rz(_) => "rz",
            Gate::Rxx(_) => "rxx",
            Gate::Ryy(_) => "ryy",
            Gate::Rzz(_) => "rzz",
            Gate::CX => "cx",
            Gate::CZ => "cz",
            Gate::Swap => "swap",
            Gate::Unitary(_) => "unitary",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            Gate::I
            | Gate::X
            | Gate::Y
            | Gate::Z
            | Gate::H
            | Gate::S
            | Gate::Sdg
            | Gate::Rx(_)
            | Gate::Ry(_)
            | Gate::Rz(_) => 1,

            Gate::Rxx(_)
            | Gate::Ryy(_)
            | Gate::Rzz(_)
            | Gate::CX
            | Gate::CZ
            | Gate::Swap
            | Gate::Unitary(_) => 2,
        }
    }

    /// The adjoint (inverse) gate.
    pub fn adjoint(&self) -> Gate {
        match self {
            Gate::S => Gate::Sdg,
            Gate::Sdg => Gate::S,
            Gate::Rx(t) => Gate::Rx(-t),
            Gate::Ry(t) => Gate::Ry(-t),
            Gate::Rz(t) => Gate::Rz(-t),
            Gate::Rxx(t) => Gate::Rxx(-t),
            Gate::Ryy(t) => Gate::Ryy(-t),
            Gate::Rzz(t) => Gate::Rzz(-t),
            Gate::Unitary(m) => Gate::Unitary(m.t().mapv(|z| z.conj())),
            // Self-inverse gates
            other => other.clone(),
        }
    }

    /// Dense matrix of the gate in the local basis.
    pub fn matrix(&self) -> Array2<Complex64> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let half = std::f64::consts::FRAC_1_SQRT_2;
        let m2 = |a, b, c, d| arr2(&[[a, b], [c, d]]);
        match self {
            Gate::I => m2(one, zero, zero, one),
            Gate::X => m2(zero, one, one, zero),
            Gate::Y => m2(zero, -i, i, zero),
            Gate::Z => m2(one, zero, zero, -one),
            Gate::H => m2(
                Complex64::new(half, 0.0),
                Complex64::new(half, 0.0),
                Complex64::new(half, 0.0),
                Complex64::new(-half, 0.0),
            ),
            Gate::S => m2(one, zero, zero, i),
            Gate::Sdg => m2(one, zero, zero, -i),
            Gate::Rx(t) => {
                let (c, s) = half_angle(*t);
                m2(c, -i * s, -i * s, c)
            }
            Gate::Ry(t) => {
                let (c, s) = half_angle(*t);
                m2(c, -s, s, c)
            }
            Gate::Rz(t) => m2(
                Complex64::from_polar(1.0, -t / 2.0),
                zero,
                zero,
                Complex64::from_polar(1.0, t / 2.0),
            ),
            Gate::Rxx(t) => {
                let (c, s) = half_angle(*t);
                let mut m = Array2::from_diag_elem(4, c);
                for k in 0..4 {
                    m[[k, 3 - k]] = -i * s;
                }
                m
            }
            Gate::Ryy(t) => {
                let (c, s) = half_angle(*t);
                let mut m = Array2::from_diag_elem(4, c);
                // Y⊗Y maps |00⟩ ↔ -|11⟩ and |01⟩ ↔ |10⟩
                m[[0, 3]] = i * s;
                m[[3, 0]] = i * s;
                m[[1, 2]] = -i * s;
                m[[2, 1]] = -i * s;
                m
            }
            Gate::Rzz(t) => {
                let even = Complex64::from_polar(1.0, -t / 2.0);
                let odd = Complex64::from_polar(1.0, t / 2.0);
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = even;
                m[[1, 1]] = odd;
                m[[2, 2]] = odd;
                m[[3, 3]] = even;
                m
            }
            Gate::CX => {
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = one;
                m[[1, 1]] = one;
                m[[2, 3]] = one;
                m[[3, 2]] = one;
                m
            }
            Gate::CZ => {
                let mut m = Array2::from_diag_elem(4, one);
                m[[3, 3]] = -one;
                m
            }
            Gate::Swap => {
                let mut m = Array2::zeros((4, 4));
                m[[0, 0]] = one;
                m[[1, 2]] = one;
                m[[2, 1]] = one;
                m[[3, 3]] = one;
                m
            }
            Gate::Unitary(m) => m.clone(),
        }
    }
}

fn half_angle(theta: f64) -> (Complex64, Complex64) {
    let (s, c) = (theta / 2.0).sin_cos();
    (Complex64::new(c, 0.0), Complex64::new(s, 0.0))
}
