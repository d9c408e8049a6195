//! Optimisation history and final report.

use serde::Serialize;

use crate::objective::Observation;

/// Snapshot taken at the end of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry<T> {
    /// 1-based sweep number.
    pub sweep: usize,
    /// Parameters after the sweep.
    pub params: Vec<f64>,
    /// Observation at those parameters.
    pub observation: T,
}

/// Outcome of a rotosolve run.
#[derive(Debug, Clone, Serialize)]
pub struct RotosolveReport<T> {
    /// Final parameters, each in (−π, π].
    pub params: Vec<f64>,
    /// Observation at the starting point.
    pub initial: T,
    /// One entry per completed sweep.
    pub history: Vec<HistoryEntry<T>>,
    /// Objective evaluations, probes included.
    pub evaluations: usize,
    /// Sweeps performed.
    pub sweeps: usize,
    /// True if the run stopped on the cost tolerance.
    pub converged: bool,
}

impl<T: Observation> RotosolveReport<T> {
    /// Cost after each sweep.
    pub fn costs(&self) -> Vec<f64> {
        self.history.iter().map(|h| h.observation.total()).collect()
    }

    /// Observation at the final parameters.
    pub fn final_observation(&self) -> &T {
        self.history.last().map_or(&self.initial, |h| &h.observation)
    }

    /// Cost at the final parameters.
    pub fn final_cost(&self) -> f64 {
        self.final_observation().total()
    }
}
