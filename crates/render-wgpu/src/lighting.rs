use cavern_common::Color;
use std::f32::consts::PI;

/// Light and atmosphere settings for the cave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub background: Color,
    pub fog_color: Color,
    pub fog_density: f32,
    pub sky: Color,
    pub ground: Color,
    pub hemisphere_intensity: f32,
    pub torch_color: Color,
    pub torch_intensity: f32,
    pub torch_range: f32,
    /// Half-angle of the spotlight cone.
    pub torch_angle: f32,
    /// Fraction of the cone that fades out at the edge.
    pub torch_penumbra: f32,
    pub marker_color: Color,
    pub marker_radius: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            background: Color::from_hex(0x020204),
            fog_color: Color::from_hex(0x000203),
            fog_density: 0.03,
            sky: Color::from_hex(0x666666),
            ground: Color::from_hex(0x040409),
            hemisphere_intensity: 0.18,
            torch_color: Color::from_hex(0xfff5d6),
            torch_intensity: 2.5,
            torch_range: 25.0,
            torch_angle: PI / 8.0,
            torch_penumbra: 0.4,
            marker_color: Color::from_hex(0xfff1c0),
            marker_radius: 0.03,
        }
    }
}

impl Lighting {
    /// Cosines of the inner and outer cone edges.
    pub fn cone_cosines(&self) -> (f32, f32) {
        let inner = self.torch_angle * (1.0 - self.torch_penumbra);
        (inner.cos(), self.torch_angle.cos())
    }
}
