//! Objectives: maps from a parameter vector to a measured observation.

use std::fmt;

use qmps_sim::{Circuit, Observable, Statevector};
use serde::{Deserialize, Serialize};

use crate::error::{OptimError, OptimResult};

/// What an objective returns for one parameter vector.
///
/// The optimiser only ever minimises [`Observation::total`]; the rest of the
/// observation is kept for the history.
pub trait Observation: Clone + fmt::Debug + Serialize {
    /// Scalar cost.
    fn total(&self) -> f64;
}

impl Observation for f64 {
    fn total(&self) -> f64 {
        *self
    }
}

/// Energy plus swap-test purities of the MPS evolution objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurityTerms {
    /// Evolution fidelity term (negative overlap).
    pub energy: f64,
    /// Purity of the reduced state built from `U` and `V`.
    pub u_purity: f64,
    /// Purity of the environment `V` alone.
    pub v_purity: f64,
    /// Cross overlap between the two.
    pub uv_purity: f64,
    /// Regulariser weight `k`.
    pub weight: f64,
}

impl PurityTerms {
    /// `u + v − 2·uv`; zero when both reduced states coincide.
    pub fn mismatch(&self) -> f64 {
        self.u_purity + self.v_purity - 2.0 * self.uv_purity
    }
}

impl Observation for PurityTerms {
    fn total(&self) -> f64 {
        self.energy + self.weight * self.mismatch()
    }
}

/// A function to be minimised by the rotosolve kernels.
pub trait Objective {
    /// Observation type recorded in the history.
    type Observation: Observation;

    /// Required parameter count, if fixed.
    fn num_parameters(&self) -> Option<usize> {
        None
    }

    /// Evaluate at `params`.
    fn observe(&self, params: &[f64]) -> OptimResult<Self::Observation>;

    /// Scalar cost at `params`.
    fn cost(&self, params: &[f64]) -> OptimResult<f64> {
        Ok(self.observe(params)?.total())
    }
}

impl<T: Objective + ?Sized> Objective for &T {
    type Observation = T::Observation;

    fn num_parameters(&self) -> Option<usize> {
        (**self).num_parameters()
    }

    fn observe(&self, params: &[f64]) -> OptimResult<Self::Observation> {
        (**self).observe(params)
    }
}

/// Reject vectors of the wrong length or with non-finite entries.
pub fn check_parameters(expected: Option<usize>, params: &[f64]) -> OptimResult<()> {
    if params.is_empty() {
        return Err(OptimError::EmptyParameters);
    }
    if let Some(expected) = expected {
        if params.len() != expected {
            return Err(OptimError::ParameterCount {
                expected,
                got: params.len(),
            });
        }
    }
    if let Some((index, &value)) = params.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptimError::NonFinite { index, value });
    }
    Ok(())
}

/// `⟨ψ(θ)|O|ψ(θ)⟩` for a parameterised state-preparation circuit.
pub struct ExpectationObjective<F, O> {
    state: F,
    observable: O,
    num_parameters: Option<usize>,
}

impl<F, O> ExpectationObjective<F, O>
where
    F: Fn(&[f64]) -> OptimResult<Circuit>,
    O: Observable,
{
    /// Objective from a circuit builder and an observable.
    pub fn new(state: F, observable: O) -> Self {
        Self {
            state,
            observable,
            num_parameters: None,
        }
    }

    /// Require exactly `n` parameters.
    #[must_use]
    pub fn with_num_parameters(mut self, n: usize) -> Self {
        self.num_parameters = Some(n);
        self
    }

    /// The observable being measured.
    pub fn observable(&self) -> &O {
        &self.observable
    }
}

impl<F, O> Objective for ExpectationObjective<F, O>
where
    F: Fn(&[f64]) -> OptimResult<Circuit>,
    O: Observable,
{
    type Observation = f64;

    fn num_parameters(&self) -> Option<usize> {
        self.num_parameters
    }

    fn observe(&self, params: &[f64]) -> OptimResult<f64> {
        let circuit = (self.state)(params)?;
        Ok(expectation(&circuit, &self.observable))
    }
}

impl<F, O: fmt::Debug> fmt::Debug for ExpectationObjective<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectationObjective")
            .field("observable", &self.observable)
            .field("num_parameters", &self.num_parameters)
            .finish_non_exhaustive()
    }
}

/// A plain closure as an objective.
pub struct FnObjective<F> {
    f: F,
    num_parameters: Option<usize>,
}

impl<F: Fn(&[f64]) -> f64> FnObjective<F> {
    /// Wrap `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            num_parameters: None,
        }
    }

    /// Require exactly `n` parameters.
    #[must_use]
    pub fn with_num_parameters(mut self, n: usize) -> Self {
        self.num_parameters = Some(n);
        self
    }
}

impl<F: Fn(&[f64]) -> f64> Objective for FnObjective<F> {
    type Observation = f64;

    fn num_parameters(&self) -> Option<usize> {
        self.num_parameters
    }

    fn observe(&self, params: &[f64]) -> OptimResult<f64> {
        Ok((self.f)(params))
    }
}

/// Simulate `circuit` from `|0…0⟩` and measure `observable`.
pub fn expectation<O: Observable>(circuit: &Circuit, observable: &O) -> f64 {
    observable.expectation(&Statevector::simulate(circuit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qmps_sim::{Hamiltonian, HamiltonianTerm, QubitId};

    #[test]
    fn test_purity_total() {
        let p = PurityTerms {
            energy: -0.9,
            u_purity: 0.8,
            v_purity: 0.7,
            uv_purity: 0.6,
            weight: 2.0,
        };
        assert!((p.mismatch() - 0.3).abs() < 1e-12);
        assert!((p.total() - (-0.9 + 0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_check_parameters() {
        assert!(check_parameters(Some(2), &[0.1, 0.2]).is_ok());
        assert!(matches!(
            check_parameters(Some(3), &[0.1]),
            Err(OptimError::ParameterCount { expected: 3, got: 1 })
        ));
        assert!(matches!(
            check_parameters(None, &[0.0, f64::NAN]),
            Err(OptimError::NonFinite { index: 1, .. })
        ));
        assert!(matches!(check_parameters(None, &[]), Err(OptimError::EmptyParameters)));
    }

    #[test]
    fn test_expectation_objective_ry_z() {
        let objective = ExpectationObjective::new(
            |p: &[f64]| {
                let mut c = Circuit::with_size("ry", 1);
                c.ry(p[0], QubitId(0))?;
                Ok(c)
            },
            Hamiltonian::from_terms(vec![HamiltonianTerm::z(0, 1.0)]),
        );
        for theta in [0.0, 0.7, -2.1] {
            let e = objective.observe(&[theta]).unwrap();
            assert!((e - theta.cos()).abs() < 1e-12);
        }
    }
}
