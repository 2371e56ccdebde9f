use crate::camera::CaveCamera;
use cavern_kernel::Population;
use glam::Vec3;
use std::fmt::Write;

/// Everything a renderer needs besides the population: the camera and the torch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub camera: CaveCamera,
    /// Where the spotlight sits.
    pub torch_position: Vec3,
    /// Where the spotlight points. The torch marker is drawn here.
    pub torch_target: Vec3,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            camera: CaveCamera::default(),
            torch_position: Vec3::new(0.0, 3.0, 3.0),
            torch_target: Vec3::ZERO,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the population and a view, then produces output. It
/// never mutates the population.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, population: &Population, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of the scene. Used by the CLI and in tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every object rather than only the hovered ones.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, population: &Population, view: &RenderView) -> String {
        let mut out = String::new();
        let cam = &view.camera;
        let _ = writeln!(
            out,
            "=== Cave ({} objects, {} nodes) ===",
            population.roots().len(),
            population.len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.target.x,
            cam.target.y,
            cam.target.z,
            cam.fov.to_degrees()
        );
        let t = view.torch_target;
        let _ = writeln!(out, "Torch: aim=({:.2}, {:.2}, {:.2})", t.x, t.y, t.z);

        let hovered = population.hovered_objects();
        match hovered.first() {
            Some(id) => {
                let meta = population.resolve_metadata(*id);
                let _ = writeln!(out, "Hovered: {} {}", id, meta.display_name);
            }
            None => out.push_str("Hovered: none\n"),
        }

        if self.verbose {
            for id in population.roots() {
                let Some(node) = population.get(*id) else {
                    continue;
                };
                let p = node.transform.position;
                let name = node
                    .metadata
                    .as_ref()
                    .map_or("Unknown", |m| m.display_name.as_str());
                let _ = writeln!(
                    out,
                    "  {:>5} {:<9} pos=({:.2}, {:.2}, {:.2}) {}",
                    id.to_string(),
                    node.kind,
                    p.x,
                    p.y,
                    p.z,
                    name
                );
            }
        }
        out
    }
}
