//! One-dimensional scans of the objective along a single coordinate.
//!
//! Useful for checking that the analytic model used by the optimiser actually
//! describes the cost landscape: a scan reports the measured cost, the model
//! prediction and their largest disagreement.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::angle::wrap_angle;
use crate::error::{OptimError, OptimResult};
use crate::objective::{Objective, check_parameters};
use crate::sinusoid::{DoubleProbes, DoubleSinusoid, Sinusoid};

/// Which trigonometric model to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanModel {
    /// `A·sin(θ + φ) + B`.
    Single,
    /// First and second harmonics.
    Double,
}

/// Result of [`scan_coordinate`].
#[derive(Debug, Clone, Serialize)]
pub struct CoordinateScan {
    /// Scanned coordinate.
    pub index: usize,
    /// Model used for the prediction.
    pub model: ScanModel,
    /// Shifts relative to the current value, from −π to π.
    pub shifts: Vec<f64>,
    /// Measured cost at each shift.
    pub measured: Vec<f64>,
    /// Model prediction at each shift.
    pub predicted: Vec<f64>,
    /// Shift the model says is optimal.
    pub optimal_shift: f64,
    /// Absolute coordinate value at the predicted optimum.
    pub optimal_value: f64,
    /// Model cost at the predicted optimum.
    pub predicted_min: f64,
}

impl CoordinateScan {
    /// Largest `|measured − predicted|`.
    pub fn max_residual(&self) -> f64 {
        self.measured
            .iter()
            .zip(&self.predicted)
            .map(|(m, p)| (m - p).abs())
            .fold(0.0, f64::max)
    }
}

/// Scan coordinate `index` over `points` equally spaced shifts in [−π, π].
pub fn scan_coordinate<O: Objective + ?Sized>(
    objective: &O,
    params: &[f64],
    index: usize,
    points: usize,
    model: ScanModel,
) -> OptimResult<CoordinateScan> {
    check_parameters(objective.num_parameters(), params)?;
    if index >= params.len() {
        return Err(OptimError::InvalidConfig(format!(
            "coordinate {index} out of range for {} parameters",
            params.len()
        )));
    }
    if points < 2 {
        return Err(OptimError::InvalidConfig(format!(
            "a scan needs at least 2 points, got {points}"
        )));
    }

    let mut work = params.to_vec();
    let base = work[index];
    let mut at = |shift: f64| -> OptimResult<f64> {
        work[index] = base + shift;
        objective.cost(&work)
    };

    let (predict, optimal_shift): (Box<dyn Fn(f64) -> f64>, f64) = match model {
        ScanModel::Single => {
            let fit = Sinusoid::fit(at(0.0)?, at(FRAC_PI_2)?, at(-FRAC_PI_2)?);
            (Box::new(move |x| fit.value(x)), fit.argmin())
        }
        ScanModel::Double => {
            let fit = DoubleSinusoid::fit(&DoubleProbes::measure(&mut at)?);
            (Box::new(move |x| fit.value(x)), fit.argmin())
        }
    };

    let step = 2.0 * PI / (points - 1) as f64;
    let shifts: Vec<f64> = (0..points).map(|k| -PI + step * k as f64).collect();
    let measured = shifts.iter().map(|&s| at(s)).collect::<OptimResult<Vec<_>>>()?;
    let predicted = shifts.iter().map(|&s| predict(s)).collect();

    Ok(CoordinateScan {
        index,
        model,
        shifts,
        measured,
        predicted,
        optimal_shift,
        optimal_value: wrap_angle(base + optimal_shift),
        predicted_min: predict(optimal_shift),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::FnObjective;

    #[test]
    fn test_single_model_matches_sinusoid() {
        let objective = FnObjective::new(|p: &[f64]| 0.7 * (p[1] - 0.2).cos() + p[0]);
        let scan = scan_coordinate(&objective, &[0.5, 1.0], 1, 25, ScanModel::Single).unwrap();
        assert_eq!(scan.shifts.len(), 25);
        assert!((scan.shifts[0] + PI).abs() < 1e-15);
        assert!((scan.shifts[24] - PI).abs() < 1e-12);
        assert!(scan.max_residual() < 1e-12);
        assert!((scan.predicted_min - (0.5 - 0.7)).abs() < 1e-12);
    }

    #[test]
    fn test_single_model_misses_second_harmonic() {
        let objective = FnObjective::new(|p: &[f64]| (2.0 * p[0]).cos());
        let single = scan_coordinate(&objective, &[0.3], 0, 33, ScanModel::Single).unwrap();
        let double = scan_coordinate(&objective, &[0.3], 0, 33, ScanModel::Double).unwrap();
        assert!(single.max_residual() > 0.1);
        assert!(double.max_residual() < 1e-12);
    }

    #[test]
    fn test_scan_argument_checks() {
        let objective = FnObjective::new(|p: &[f64]| p[0]);
        assert!(scan_coordinate(&objective, &[0.0], 1, 10, ScanModel::Single).is_err());
        assert!(scan_coordinate(&objective, &[0.0], 0, 1, ScanModel::Single).is_err());
    }
}
