//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - rotosolve time evolution of matrix product states",
        style("qmps").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qmps-sim     Circuit IR and statevector simulation");
    println!("  qmps-tensor  MPS tensor and unitary conversions");
    println!("  qmps-optim   Rotosolve kernels and MPS objectives");
    println!("  qmps-cli     Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
