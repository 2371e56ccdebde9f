//! Cave kernel: the object population and its per-frame animation.
//!
//! # Invariants
//! - The population is built once at setup; nodes are never removed.
//! - Every sub-part shares its owner's kind.
//! - Behavior updates write positions and rotations only, never scale.
//! - Olm positions stay inside the configured crawl bounds after every update.

pub mod behavior;
pub mod population;

pub use behavior::{BatMotion, BatPose, Behavior, OlmMotion, advance, glow_intensity};
pub use population::{Highlight, Node, ObjectSpec, Part, PartSpec, Population, Visual};
