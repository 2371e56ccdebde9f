use cavern_common::Color;
use serde::{Deserialize, Serialize};

/// Physically-inspired surface parameters.
///
/// Every mesh node owns its own copy: highlight and glow write `emissive` and
/// `emissive_intensity` per node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub base_color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Color::rgb(0.8, 0.8, 0.8),
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

impl Material {
    pub fn standard(base_color: u32) -> Self {
        Self {
            base_color: Color::from_hex(base_color),
            ..Self::default()
        }
    }

    pub fn with_emissive(mut self, emissive: u32, intensity: f32) -> Self {
        self.emissive = Color::from_hex(emissive);
        self.emissive_intensity = intensity;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    /// Radiance added on top of lighting.
    pub fn emitted(&self) -> Color {
        self.emissive.scaled(self.emissive_intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_material_does_not_emit() {
        assert_eq!(Material::default().emitted(), Color::BLACK);
    }

    #[test]
    fn emitted_scales_by_intensity() {
        let m = Material::standard(0x55aa33).with_emissive(0x22ff33, 0.5);
        let e = m.emitted();
        assert!((e.g - 0.5).abs() < 1e-6);
    }

    #[test]
    fn roughness_is_clamped() {
        let m = Material::standard(0x3b3b3b).with_roughness(3.0);
        assert_eq!(m.roughness, 1.0);
    }
}
