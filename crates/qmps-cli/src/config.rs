//! Experiment configuration.
//!
//! Values are resolved with the following priority (later sources override
//! earlier ones):
//!
//! 1. Built-in defaults
//! 2. YAML file given with `--config` (or `QMPS_CONFIG`)
//! 3. Command-line flags (some also read from `QMPS_*` variables)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use qmps_optim::RotosolveConfig;
use qmps_sim::Hamiltonian;
use serde::{Deserialize, Serialize};

/// Settings shared by every experiment command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Two-site Hamiltonian as `label: coefficient` (`X`, `ZZ`, `XI`, ...).
    pub hamiltonian: BTreeMap<String, f64>,
    /// Time step.
    pub dt: f64,
    /// Number of time steps for `evolve`.
    pub steps: usize,
    /// Rotosolve sweeps per optimisation.
    pub sweeps: usize,
    /// Stop a run early once the cost changes by less than this.
    pub tolerance: Option<f64>,
    /// Purity regulariser weight `k`.
    pub weight: f64,
    /// Seed for the initial parameters.
    pub seed: u64,
    /// Re-draw random parameters at every time step instead of continuing
    /// from the previous solution.
    pub cold_start: bool,
    /// Points per coordinate for `scan`.
    pub scan_points: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            hamiltonian: BTreeMap::from([("X".to_string(), 1.0)]),
            dt: 0.1,
            steps: 20,
            sweeps: 200,
            tolerance: None,
            weight: 1.0,
            seed: 42,
            cold_start: false,
            scan_points: 65,
        }
    }
}

impl ExperimentConfig {
    /// Parse a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self> {
        serde_yaml_ng::from_str(source).context("Invalid experiment configuration")
    }

    /// Load a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&source).with_context(|| format!("In {}", path.display()))
    }

    /// Defaults, then the optional file, then flag overrides; validated.
    pub fn resolve(args: &ExperimentArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        args.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.hamiltonian.is_empty() {
            bail!("Hamiltonian has no terms");
        }
        if !self.dt.is_finite() {
            bail!("dt must be finite, got {}", self.dt);
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            bail!("weight must be finite and non-negative, got {}", self.weight);
        }
        if let Some(tol) = self.tolerance {
            if !tol.is_finite() || tol < 0.0 {
                bail!("tolerance must be finite and non-negative, got {tol}");
            }
        }
        if self.scan_points < 2 {
            bail!("scan_points must be at least 2, got {}", self.scan_points);
        }
        self.two_site_hamiltonian()?;
        Ok(())
    }

    /// The configured Hamiltonian.
    pub fn two_site_hamiltonian(&self) -> Result<Hamiltonian> {
        let couplings: Vec<(&str, f64)> = self
            .hamiltonian
            .iter()
            .map(|(label, &coeff)| (label.as_str(), coeff))
            .collect();
        Hamiltonian::two_site(&couplings).context("Invalid Hamiltonian")
    }

    /// Optimiser settings for one run.
    pub fn rotosolve(&self) -> RotosolveConfig {
        RotosolveConfig {
            max_sweeps: self.sweeps,
            tolerance: self.tolerance,
        }
    }
}

/// Command-line overrides for [`ExperimentConfig`].
#[derive(Debug, Clone, Default, Args)]
pub struct ExperimentArgs {
    /// YAML configuration file
    #[arg(short, long, env = "QMPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hamiltonian term as LABEL=COEFF (repeatable; replaces the configured terms)
    #[arg(long = "term", value_name = "LABEL=COEFF", value_parser = parse_term)]
    pub terms: Vec<(String, f64)>,

    /// Time step
    #[arg(long, allow_negative_numbers = true)]
    pub dt: Option<f64>,

    /// Number of time steps
    #[arg(long)]
    pub steps: Option<usize>,

    /// Rotosolve sweeps per optimisation
    #[arg(long)]
    pub sweeps: Option<usize>,

    /// Stop early when the cost changes by less than this between sweeps
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Purity regulariser weight
    #[arg(long)]
    pub weight: Option<f64>,

    /// Random seed for the initial parameters
    #[arg(long, env = "QMPS_SEED")]
    pub seed: Option<u64>,

    /// Re-draw random parameters at every time step
    #[arg(long)]
    pub cold_start: bool,

    /// Points per scanned coordinate
    #[arg(long)]
    pub points: Option<usize>,
}

impl ExperimentArgs {
    /// Overwrite every field that was given on the command line.
    pub fn apply(&self, config: &mut ExperimentConfig) {
        if !self.terms.is_empty() {
            config.hamiltonian = self.terms.iter().cloned().collect();
        }
        if let Some(dt) = self.dt {
            config.dt = dt;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(sweeps) = self.sweeps {
            config.sweeps = sweeps;
        }
        if self.tolerance.is_some() {
            config.tolerance = self.tolerance;
        }
        if let Some(weight) = self.weight {
            config.weight = weight;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.cold_start {
            config.cold_start = true;
        }
        if let Some(points) = self.points {
            config.scan_points = points;
        }
    }
}

/// Parse `LABEL=COEFF`.
pub fn parse_term(s: &str) -> Result<(String, f64), String> {
    let (label, coeff) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=COEFF, got '{s}'"))?;
    let label = label.trim();
    if label.is_empty() {
        return Err(format!("missing Pauli label in '{s}'"));
    }
    let coeff: f64 = coeff
        .trim()
        .parse()
        .map_err(|e| format!("invalid coefficient in '{s}': {e}"))?;
    Ok((label.to_uppercase(), coeff))
}
