//! `qmps-optim`: rotosolve optimisation for variational MPS circuits.
//!
//! Expectation values of circuits built from `exp(−iθP/2)` rotations are
//! trigonometric polynomials in each angle. The optimisers here exploit that:
//! a handful of probes pins down the one-dimensional landscape exactly, and
//! each coordinate jumps straight to its minimum.
//!
//! - [`rotosolve`] / [`double_rotosolve`]: the sweep kernels
//! - [`Objective`]: what gets minimised, with [`ExpectationObjective`] and
//!   [`FnObjective`] as generic implementations
//! - [`mps`]: the time-evolution objective for a bond-dimension-2 MPS
//! - [`scan_coordinate`]: model-vs-measurement diagnostics
//!
//! # Example
//!
//! ```rust
//! use qmps_optim::{FnObjective, RotosolveConfig, rotosolve};
//!
//! let objective = FnObjective::new(|p: &[f64]| p[0].cos() + 2.0 * (p[1] - 0.5).sin());
//! let report = rotosolve(&objective, &[0.0, 0.0], &RotosolveConfig::new(2), ()).unwrap();
//! assert!((report.final_cost() + 3.0).abs() < 1e-12);
//! ```

pub mod angle;
pub mod error;
pub mod mps;
pub mod objective;
pub mod report;
pub mod rotosolve;
pub mod scan;
pub mod sinusoid;

pub use angle::wrap_angle;
pub use error::{OptimError, OptimResult};
pub use mps::{EvolutionObjective, GATE_PARAMETERS, MPS_PARAMETERS, magnetisation};
pub use objective::{ExpectationObjective, FnObjective, Objective, Observation, PurityTerms};
pub use report::{HistoryEntry, RotosolveReport};
pub use rotosolve::{Progress, RotosolveConfig, double_rotosolve, rotosolve};
pub use scan::{CoordinateScan, ScanModel, scan_coordinate};
pub use sinusoid::{BoundedMinimum, DoubleProbes, DoubleSinusoid, Sinusoid, bounded_minimize};
