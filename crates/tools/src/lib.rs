//! Developer tooling: population inspector and placement audit.
//!
//! # Invariants
//! - Tools only read the population.

mod inspector;

pub use inspector::{BoundsViolation, ObjectInfo, PopulationInspector, PopulationSummary};

pub fn crate_info() -> &'static str {
    "cavern-tools v0.1.0"
}
