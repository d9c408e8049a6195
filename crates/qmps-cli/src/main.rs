//! qmps Command-Line Interface
//!
//! Time evolution and ground-state search for translation-invariant matrix
//! product states prepared by two-qubit gate circuits, optimised with
//! rotosolve.
//!
//! ```text
//! qmps evolve --steps 20 --dt 0.1 --term X=1 -o evolution.json
//! qmps rotosolve --term ZZ=1 --term X=0.5 --sweeps 50
//! qmps scan --objective evolution --coordinate 0
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use qmps_optim::ScanModel;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use commands::scan::ScanObjective;
use commands::{evolve, rotosolve, scan, version};
use config::ExperimentArgs;

/// qmps - rotosolve time evolution of matrix product states
#[derive(Parser)]
#[command(name = "qmps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Coordinate model used by the optimiser or the scan.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    /// First harmonic only (three probes per coordinate)
    Single,
    /// First and second harmonics (six probes per coordinate)
    Double,
}

impl From<ModelArg> for ScanModel {
    fn from(model: ModelArg) -> Self {
        match model {
            ModelArg::Single => ScanModel::Single,
            ModelArg::Double => ScanModel::Double,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve an MPS in time, one rotosolve optimisation per step
    Evolve {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Output file for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Minimise the energy of a two-site Hamiltonian on the MPS
    Rotosolve {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Coordinate model
        #[arg(short, long, value_enum, default_value = "single")]
        model: ModelArg,

        /// Output file for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Scan single coordinates and compare with the analytic model
    Scan {
        #[command(flatten)]
        experiment: ExperimentArgs,

        /// Cost to scan
        #[arg(long, value_enum, default_value = "evolution")]
        objective: ScanObjective,

        /// Coordinate model
        #[arg(short, long, value_enum, default_value = "double")]
        model: ModelArg,

        /// Scan only this coordinate (all if omitted)
        #[arg(long)]
        coordinate: Option<usize>,

        /// Output file for the JSON report (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Evolve {
            experiment,
            output,
            compact,
        } => evolve::execute(&experiment, output.as_deref(), compact),

        Commands::Rotosolve {
            experiment,
            model,
            output,
            compact,
        } => rotosolve::execute(&experiment, model.into(), output.as_deref(), compact),

        Commands::Scan {
            experiment,
            objective,
            model,
            coordinate,
            output,
            compact,
        } => scan::execute(
            &experiment,
            objective,
            model.into(),
            coordinate,
            output.as_deref(),
            compact,
        ),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
