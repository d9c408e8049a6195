//! Shared helpers for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use qmps_optim::{MPS_PARAMETERS, Progress};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::Serialize;

/// Version of the JSON report layout.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Information for reproducing a run.
#[derive(Debug, Clone, Serialize)]
pub struct ReproducibilityInfo {
    /// qmps version used.
    pub qmps_version: String,
    /// Command line of this run.
    pub cli_args: Vec<String>,
    /// Schema version of the output format.
    pub schema_version: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl ReproducibilityInfo {
    /// Capture the current process context.
    pub fn capture() -> Self {
        Self {
            qmps_version: env!("CARGO_PKG_VERSION").to_string(),
            cli_args: std::env::args().collect(),
            schema_version: SCHEMA_VERSION.into(),
            started_at: Utc::now(),
        }
    }
}

/// Standard-normal initial angles, as many as the MPS ansatz needs.
pub fn random_params<R: Rng + ?Sized>(rng: &mut R) -> Vec<f64> {
    (0..MPS_PARAMETERS).map(|_| rng.sample(StandardNormal)).collect()
}

/// Create a progress bar on stderr.
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(bar_style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

/// Drives a progress bar from optimiser callbacks, one tick per sweep.
pub struct BarProgress<'a> {
    bar: &'a ProgressBar,
    label: String,
}

impl<'a> BarProgress<'a> {
    /// Report into `bar`, prefixing messages with `label`.
    pub fn new(bar: &'a ProgressBar, label: impl Into<String>) -> Self {
        Self {
            bar,
            label: label.into(),
        }
    }
}

impl Progress for BarProgress<'_> {
    fn on_sweep(&mut self, _sweep: usize, cost: f64) {
        self.bar.inc(1);
        self.bar.set_message(format!("{} cost {cost:+.8}", self.label));
    }
}

/// Serialise `report` as JSON to `output`, or to stdout when `None`.
pub fn write_json<T: Serialize>(report: &T, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("Failed to serialise report")?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("OK").green().bold(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
