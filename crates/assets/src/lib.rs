//! Procedural asset pipeline: mesh primitives, deformation and materials.
//!
//! Every shape in the cave is built here at generation time. Nothing is loaded
//! from disk; meshes are owned by the nodes that draw them.
//!
//! # Invariants
//! - Normals are recomputed after every positional change.
//! - Deformation is applied once, at creation.

mod material;
mod mesh;

pub use material::Material;
pub use mesh::{Aabb, Mesh};
