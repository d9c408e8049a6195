//! Coordinate-wise exact minimisation (rotosolve).
//!
//! Every coordinate is optimised in closed form by fitting the trigonometric
//! model that the cost is known to follow along that axis, then jumping to
//! the model's minimum. One sweep visits all coordinates in order.

use std::f64::consts::FRAC_PI_2;

use tracing::{debug, trace};

use crate::angle::wrap_angle;
use crate::error::{OptimError, OptimResult};
use crate::objective::{Objective, Observation, check_parameters};
use crate::report::{HistoryEntry, RotosolveReport};
use crate::sinusoid::{DoubleProbes, DoubleSinusoid, Sinusoid};

/// Optimiser settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotosolveConfig {
    /// Upper bound on sweeps.
    pub max_sweeps: usize,
    /// Stop once the cost changes by less than this between sweeps.
    pub tolerance: Option<f64>,
}

impl Default for RotosolveConfig {
    fn default() -> Self {
        Self {
            max_sweeps: 200,
            tolerance: None,
        }
    }
}

impl RotosolveConfig {
    /// Config running exactly `max_sweeps` sweeps.
    pub fn new(max_sweeps: usize) -> Self {
        Self {
            max_sweeps,
            tolerance: None,
        }
    }

    /// Enable early stopping.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    fn validate(&self) -> OptimResult<()> {
        match self.tolerance {
            Some(t) if !t.is_finite() || t < 0.0 => Err(OptimError::InvalidConfig(format!(
                "tolerance must be finite and non-negative, got {t}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Hooks called while the optimiser runs.
pub trait Progress {
    /// A coordinate has been updated.
    fn on_coordinate(&mut self, _sweep: usize, _index: usize) {}

    /// A sweep has finished with the given cost.
    fn on_sweep(&mut self, _sweep: usize, _cost: f64) {}
}

impl Progress for () {}

impl<P: Progress + ?Sized> Progress for &mut P {
    fn on_coordinate(&mut self, sweep: usize, index: usize) {
        (**self).on_coordinate(sweep, index);
    }

    fn on_sweep(&mut self, sweep: usize, cost: f64) {
        (**self).on_sweep(sweep, cost);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Single,
    Double,
}

/// Rotosolve for costs that are a single sinusoid in every coordinate.
///
/// Three probes per coordinate at shifts `0`, `±π/2`.
pub fn rotosolve<O, P>(
    objective: &O,
    initial: &[f64],
    config: &RotosolveConfig,
    progress: P,
) -> OptimResult<RotosolveReport<O::Observation>>
where
    O: Objective + ?Sized,
    P: Progress,
{
    run(objective, initial, config, progress, Step::Single)
}

/// Rotosolve for costs where every coordinate contributes first and second
/// harmonics.
///
/// Six probes per coordinate; the model minimum is taken only when it does
/// not predict a higher cost than staying put.
pub fn double_rotosolve<O, P>(
    objective: &O,
    initial: &[f64],
    config: &RotosolveConfig,
    progress: P,
) -> OptimResult<RotosolveReport<O::Observation>>
where
    O: Objective + ?Sized,
    P: Progress,
{
    run(objective, initial, config, progress, Step::Double)
}

fn run<O, P>(
    objective: &O,
    initial: &[f64],
    config: &RotosolveConfig,
    mut progress: P,
    step: Step,
) -> OptimResult<RotosolveReport<O::Observation>>
where
    O: Objective + ?Sized,
    P: Progress,
{
    config.validate()?;
    check_parameters(objective.num_parameters(), initial)?;

    let mut params: Vec<f64> = initial.iter().map(|&x| wrap_angle(x)).collect();
    let mut evaluations = 0;

    let start = objective.observe(&params)?;
    evaluations += 1;
    let mut last_cost = start.total();
    debug!(
        parameters = params.len(),
        max_sweeps = config.max_sweeps,
        ?step,
        cost = last_cost,
        "starting rotosolve"
    );

    let mut history = Vec::with_capacity(config.max_sweeps);
    let mut converged = false;

    for sweep in 1..=config.max_sweeps {
        for index in 0..params.len() {
            let theta = match step {
                Step::Single => single_step(objective, &mut params, index, &mut evaluations)?,
                Step::Double => double_step(objective, &mut params, index, &mut evaluations)?,
            };
            params[index] = wrap_angle(params[index] + theta);
            trace!(sweep, index, theta, value = params[index], "coordinate update");
            progress.on_coordinate(sweep, index);
        }

        let observation = objective.observe(&params)?;
        evaluations += 1;
        let cost = observation.total();
        debug!(sweep, cost, delta = cost - last_cost, "sweep complete");
        progress.on_sweep(sweep, cost);
        history.push(HistoryEntry {
            sweep,
            params: params.clone(),
            observation,
        });

        if let Some(tol) = config.tolerance {
            if (cost - last_cost).abs() < tol {
                converged = true;
                last_cost = cost;
                break;
            }
        }
        last_cost = cost;
    }

    debug!(
        sweeps = history.len(),
        evaluations,
        converged,
        cost = last_cost,
        "rotosolve finished"
    );
    Ok(RotosolveReport {
        params,
        initial: start,
        sweeps: history.len(),
        history,
        evaluations,
        converged,
    })
}

/// Cost with coordinate `index` shifted by `shift`; the coordinate is
/// restored afterwards.
fn probe<O: Objective + ?Sized>(
    objective: &O,
    params: &mut [f64],
    index: usize,
    shift: f64,
    evaluations: &mut usize,
) -> OptimResult<f64> {
    let base = params[index];
    params[index] = base + shift;
    let cost = objective.cost(params);
    params[index] = base;
    *evaluations += 1;
    let cost = cost?;
    if !cost.is_finite() {
        return Err(OptimError::NonFinite { index, value: cost });
    }
    Ok(cost)
}

fn single_step<O: Objective + ?Sized>(
    objective: &O,
    params: &mut [f64],
    index: usize,
    evaluations: &mut usize,
) -> OptimResult<f64> {
    let e0 = probe(objective, params, index, 0.0, evaluations)?;
    let e_plus = probe(objective, params, index, FRAC_PI_2, evaluations)?;
    let e_minus = probe(objective, params, index, -FRAC_PI_2, evaluations)?;
    Ok(Sinusoid::fit(e0, e_plus, e_minus).argmin())
}

fn double_step<O: Objective + ?Sized>(
    objective: &O,
    params: &mut [f64],
    index: usize,
    evaluations: &mut usize,
) -> OptimResult<f64> {
    let probes =
        DoubleProbes::measure(|shift| probe(objective, params, index, shift, evaluations))?;
    let model = DoubleSinusoid::fit(&probes);
    let theta = model.argmin();
    if model.value(theta) <= model.value(0.0) {
        Ok(theta)
    } else {
        Ok(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::FnObjective;
    use std::f64::consts::PI;

    #[derive(Default)]
    struct Recorder {
        coordinates: usize,
        sweeps: Vec<f64>,
    }

    impl Progress for Recorder {
        fn on_coordinate(&mut self, _sweep: usize, _index: usize) {
            self.coordinates += 1;
        }

        fn on_sweep(&mut self, _sweep: usize, cost: f64) {
            self.sweeps.push(cost);
        }
    }

    #[test]
    fn test_single_sinusoid_solved_in_one_sweep() {
        let objective = FnObjective::new(|p: &[f64]| 2.0 * (p[0] + 0.3).sin() - 1.0);
        let report = rotosolve(&objective, &[1.0], &RotosolveConfig::new(1), ()).unwrap();
        assert!((report.final_cost() + 3.0).abs() < 1e-12);
        assert!((report.params[0] - wrap_angle(-FRAC_PI_2 - 0.3)).abs() < 1e-12);
        // start + 3 probes + end of sweep
        assert_eq!(report.evaluations, 5);
    }

    #[test]
    fn test_separable_sum_converges_with_tolerance() {
        let objective = FnObjective::new(|p: &[f64]| {
            p.iter()
                .enumerate()
                .map(|(i, x)| (x + i as f64).cos())
                .sum::<f64>()
        });
        let config = RotosolveConfig::new(50).with_tolerance(1e-12);
        let report = rotosolve(&objective, &[0.1, 0.2, 0.3], &config, ()).unwrap();
        assert!(report.converged);
        assert!(report.sweeps < 50);
        assert!((report.final_cost() + 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_double_solves_second_harmonic() {
        let objective =
            FnObjective::new(|p: &[f64]| (2.0 * p[0]).sin() + 0.5 * p[0].cos() + 0.2);
        let report = double_rotosolve(&objective, &[0.0], &RotosolveConfig::new(1), ()).unwrap();
        let grid_min = (0..20_000)
            .map(|i| {
                let x = -PI + 2.0 * PI * i as f64 / 20_000.0;
                (2.0 * x).sin() + 0.5 * x.cos() + 0.2
            })
            .fold(f64::INFINITY, f64::min);
        assert!(report.final_cost() <= grid_min + 1e-9);
        // start + 6 probes + end of sweep
        assert_eq!(report.evaluations, 8);
    }

    #[test]
    fn test_progress_hooks() {
        let objective = FnObjective::new(|p: &[f64]| p[0].cos() + p[1].sin());
        let mut recorder = Recorder::default();
        let report =
            rotosolve(&objective, &[0.0, 0.0], &RotosolveConfig::new(3), &mut recorder).unwrap();
        assert_eq!(recorder.coordinates, 6);
        assert_eq!(recorder.sweeps, report.costs());
    }

    #[test]
    fn test_zero_sweeps_reports_start() {
        let objective = FnObjective::new(|p: &[f64]| p[0].cos());
        let report = rotosolve(&objective, &[0.5], &RotosolveConfig::new(0), ()).unwrap();
        assert_eq!(report.sweeps, 0);
        assert!((report.final_cost() - 0.5f64.cos()).abs() < 1e-15);
    }

    #[test]
    fn test_half_turn_lands_on_upper_endpoint() {
        let objective = FnObjective::new(|p: &[f64]| p[0].cos());
        let report = rotosolve(&objective, &[0.0], &RotosolveConfig::new(1), ()).unwrap();
        assert_eq!(report.params[0], PI);
        assert!((report.final_cost() + 1.0).abs() < 1e-12);

        let report = rotosolve(&objective, &[-PI], &RotosolveConfig::new(0), ()).unwrap();
        assert_eq!(report.params[0], PI);
    }

    #[test]
    fn test_rejects_bad_input() {
        let objective = FnObjective::new(|p: &[f64]| p[0]).with_num_parameters(2);
        let config = RotosolveConfig::default();
        assert!(matches!(
            rotosolve(&objective, &[0.0], &config, ()),
            Err(OptimError::ParameterCount { .. })
        ));
        let bad_tol = RotosolveConfig::new(1).with_tolerance(-1.0);
        assert!(matches!(
            rotosolve(&objective, &[0.0, 0.0], &bad_tol, ()),
            Err(OptimError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_finite_cost_is_an_error() {
        let objective = FnObjective::new(|p: &[f64]| if p[0] > 1.0 { f64::NAN } else { 0.0 });
        let result = rotosolve(&objective, &[0.0], &RotosolveConfig::new(1), ());
        assert!(matches!(result, Err(OptimError::NonFinite { index: 0, .. })));
    }
}
