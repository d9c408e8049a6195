//! CLI command implementations.

pub mod common;
pub mod evolve;
pub mod rotosolve;
pub mod scan;
pub mod version;
