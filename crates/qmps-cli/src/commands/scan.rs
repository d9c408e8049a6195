//! Scan command implementation.
//!
//! `qmps scan [--objective evolution] [--model double] [--coordinate 3] [--points 65]`
//!
//! Sweeps coordinates one at a time at a seeded random point and compares
//! the measured cost with the optimiser's analytic model.

use std::path::Path;

use anyhow::{Result, bail};
use clap::ValueEnum;
use console::style;
use qmps_optim::mps::state_energy;
use qmps_optim::{
    CoordinateScan, EvolutionObjective, MPS_PARAMETERS, Objective, ScanModel, scan_coordinate,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::debug;

use super::common::{ReproducibilityInfo, create_progress_bar, random_params, write_json};
use crate::config::{ExperimentArgs, ExperimentConfig};

/// Which cost to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanObjective {
    /// One evolution step (overlap plus purity regulariser).
    Evolution,
    /// Energy of the Hamiltonian on the state circuit.
    Energy,
}

/// Collected scans.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Run metadata.
    pub reproducibility: ReproducibilityInfo,
    /// Resolved configuration.
    pub config: ExperimentConfig,
    /// Scanned cost.
    pub objective: ScanObjective,
    /// Point the scans are centred on.
    pub params: Vec<f64>,
    /// One scan per coordinate.
    pub scans: Vec<CoordinateScan>,
    /// Largest model residual over all scans.
    pub max_residual: f64,
}

fn scan_all<O: Objective + ?Sized>(
    objective: &O,
    params: &[f64],
    coordinates: &[usize],
    points: usize,
    model: ScanModel,
) -> Result<Vec<CoordinateScan>> {
    let bar = create_progress_bar(coordinates.len() as u64, "scanning");
    let mut scans = Vec::with_capacity(coordinates.len());
    for &index in coordinates {
        let scan = scan_coordinate(objective, params, index, points, model)?;
        debug!(index, residual = scan.max_residual(), "coordinate scanned");
        bar.inc(1);
        scans.push(scan);
    }
    bar.finish_and_clear();
    Ok(scans)
}

/// Scan `coordinate` (or all of them) at a seeded random point.
pub fn run(
    config: &ExperimentConfig,
    objective: ScanObjective,
    model: ScanModel,
    coordinate: Option<usize>,
) -> Result<ScanReport> {
    let coordinates: Vec<usize> = match coordinate {
        Some(i) if i >= MPS_PARAMETERS => {
            bail!("Coordinate {i} out of range (0..{MPS_PARAMETERS})")
        }
        Some(i) => vec![i],
        None => (0..MPS_PARAMETERS).collect(),
    };

    let hamiltonian = config.two_site_hamiltonian()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let old = random_params(&mut rng);
    let params = random_params(&mut rng);

    let scans = match objective {
        ScanObjective::Evolution => {
            let cost = EvolutionObjective::new(&old, &hamiltonian, config.dt, config.weight)?;
            scan_all(&cost, &params, &coordinates, config.scan_points, model)?
        }
        ScanObjective::Energy => {
            let cost = state_energy(&hamiltonian);
            scan_all(&cost, &params, &coordinates, config.scan_points, model)?
        }
    };
    let max_residual = scans
        .iter()
        .map(CoordinateScan::max_residual)
        .fold(0.0, f64::max);

    Ok(ScanReport {
        reproducibility: ReproducibilityInfo::capture(),
        config: config.clone(),
        objective,
        params,
        scans,
        max_residual,
    })
}

/// Execute the scan command.
pub fn execute(
    args: &ExperimentArgs,
    objective: ScanObjective,
    model: ScanModel,
    coordinate: Option<usize>,
    output: Option<&Path>,
    compact: bool,
) -> Result<()> {
    let config = ExperimentConfig::resolve(args)?;
    let report = run(&config, objective, model, coordinate)?;
    write_json(&report, output, !compact)?;

    eprintln!();
    eprintln!("{}", style("Scan Summary").bold().underlined());
    eprintln!(
        "  {} coordinate(s), {} points each",
        report.scans.len(),
        config.scan_points
    );
    let verdict = if report.max_residual < 1e-8 {
        style("model exact").green()
    } else {
        style("model mismatch").yellow()
    };
    eprintln!("  Max residual: {:.3e} [{}]", report.max_residual, verdict);
    Ok(())
}
