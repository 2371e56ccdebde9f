//! Procedural population of the cave: stalagmites, crystal clusters,
//! stalactites, fungi, bacteria, bats and olms, plus the static scenery.
//!
//! # Invariants
//! - Every top-level object carries metadata from the [`catalog`].
//! - Spawn positions fall inside the extents `PopulationConfig::allowed_extents`
//!   names for the object's kind.
//! - Per-vertex jitter is applied once, at creation.

pub mod catalog;
mod generator;

pub use generator::{Cave, SceneryPiece, generate, scenery};
