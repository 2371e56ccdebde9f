//! Rendering adapter: camera, pointer rays, scene picking and a
//! renderer-agnostic drawing interface.
//!
//! # Invariants
//! - Renderers read the population; they never mutate it.
//! - Pointer rays originate at the camera and have unit length.
//! - Pickers report hits nearest first and only against population geometry,
//!   never scenery.

mod camera;
mod picking;
mod renderer;

pub use camera::CaveCamera;
pub use picking::{CpuPicker, Hit, Ray, ScenePicker};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "cavern-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
