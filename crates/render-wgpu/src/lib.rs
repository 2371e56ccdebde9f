//! wgpu render backend for the cave.
//!
//! Draws the static scenery, every population mesh in world space and the
//! torch marker, lit by a hemisphere ambient term and the torch spotlight,
//! with exponential fog.
//!
//! # Invariants
//! - Renderer never mutates the population.
//! - Scenery is uploaded once; population geometry is rebuilt every frame so
//!   highlight, pulse and glow changes show immediately.

mod gpu;
mod lighting;
mod shaders;

pub use gpu::WgpuRenderer;
pub use lighting::Lighting;
