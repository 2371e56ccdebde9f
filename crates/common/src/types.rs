use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node in the population arena.
///
/// Ids are handed out in creation order and never reused: the population is
/// built once and nothing is removed during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-parent matrix (scale, then rotate, then translate).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// The category of a placed object. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mineral,
    Fungi,
    Bacteria,
    Bat,
    Olm,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 5] = [
        ObjectKind::Mineral,
        ObjectKind::Fungi,
        ObjectKind::Bacteria,
        ObjectKind::Bat,
        ObjectKind::Olm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Mineral => "mineral",
            ObjectKind::Fungi => "fungi",
            ObjectKind::Bacteria => "bacteria",
            ObjectKind::Bat => "bat",
            ObjectKind::Olm => "olm",
        }
    }

    /// Kinds whose emissive intensity follows the ambient glow pulse.
    pub fn glows(self) -> bool {
        matches!(self, ObjectKind::Mineral | ObjectKind::Fungi)
    }

    pub fn is_creature(self) -> bool {
        matches!(self, ObjectKind::Bat | ObjectKind::Olm)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display name and description shown when an object is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub display_name: String,
    pub description: String,
}

impl Metadata {
    pub fn new(display_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: description.into(),
        }
    }

    /// Substitute used when no node in an ancestor chain carries metadata.
    pub fn unknown() -> Self {
        Self::new("Unknown", "No description.")
    }
}

/// Linear RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Move `t` of the way toward `target`.
    pub fn lerp(self, target: Color, t: f32) -> Self {
        Self::rgb(
            self.r + (target.r - self.r) * t,
            self.g + (target.g - self.g) * t,
            self.b + (target.b - self.b) * t,
        )
    }

    /// Largest per-channel difference to `other`.
    pub fn distance(self, other: Color) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::rgb(self.r * factor, self.g * factor, self.b * factor)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_default_is_identity() {
        let t = Transform::default();
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn transform_matrix_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let p = t.matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn only_minerals_and_fungi_glow() {
        let glowing: Vec<ObjectKind> = ObjectKind::ALL
            .into_iter()
            .filter(|k| k.glows())
            .collect();
        assert_eq!(glowing, vec![ObjectKind::Mineral, ObjectKind::Fungi]);
        assert!(ObjectKind::Bat.is_creature());
        assert!(!ObjectKind::Bacteria.is_creature());
    }

    #[test]
    fn unknown_metadata_text() {
        let m = Metadata::unknown();
        assert_eq!(m.display_name, "Unknown");
        assert_eq!(m.description, "No description.");
    }

    #[test]
    fn color_from_hex() {
        let c = Color::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn color_lerp_approaches_target() {
        let target = Color::from_hex(0x222222);
        let mut c = Color::BLACK;
        let mut last = c.distance(target);
        for _ in 0..20 {
            c = c.lerp(target, 0.25);
            let d = c.distance(target);
            assert!(d < last);
            last = d;
        }
    }
}
