use crate::population::{Part, Population};
use cavern_common::{BehaviorConfig, NodeId, Span};
use glam::{EulerRot, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_6;

/// Tilt of a bat wing about X at rest. Flapping rotates about Z on top of it.
pub const WING_TILT: f32 = FRAC_PI_6;

/// Per-object animation attached to a top-level node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Behavior {
    #[default]
    Static,
    /// Pulsing emissive intensity over the whole subtree.
    Glow,
    Bat(BatMotion),
    Olm(OlmMotion),
}

/// Closed-form flight path for a bat, keyed to its spawn point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatMotion {
    pub spawn: Vec3,
    pub initial_yaw: f32,
    pub flap_speed: f32,
}

/// Pose of a bat at an instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatPose {
    pub position: Vec3,
    pub yaw: f32,
    /// Wing flap angle in radians, always within [0.1, 0.8].
    pub flap: f32,
}

impl BatMotion {
    pub fn new(spawn: Vec3, initial_yaw: f32) -> Self {
        Self {
            spawn,
            initial_yaw,
            flap_speed: 6.0 + spawn.x % 3.0,
        }
    }

    /// Horizontal drift is measured from the spawn point so `t = 0` sits on it.
    pub fn pose(&self, t: f32, config: &BehaviorConfig) -> BatPose {
        let s = self.spawn;
        let amplitude = config.bat_drift_amplitude;
        let x = s.x + ((0.6 * t + s.z).sin() - s.z.sin()) * amplitude;
        let z = s.z + ((0.5 * t + s.x).cos() - s.x.cos()) * amplitude;
        let y = config.bat_hover_height + (1.2 * t + s.x).sin() * config.bat_bob_amplitude;
        BatPose {
            position: Vec3::new(x, y, z),
            yaw: self.initial_yaw + config.bat_yaw_rate * t,
            flap: (t * self.flap_speed).sin() * 0.35 + 0.45,
        }
    }
}

/// Floor-crawling drift for an olm.
///
/// The path is closed-form in time plus an accumulated `shift` that records
/// every wrap, so a reset lands exactly on the opposite bound and motion
/// continues smoothly from there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlmMotion {
    pub spawn: Vec3,
    pub wander_speed: f32,
    pub shift: Vec2,
}

impl OlmMotion {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            spawn,
            wander_speed: 0.6 + (spawn.x % 2.0) * 0.05,
            shift: Vec2::ZERO,
        }
    }

    fn unwrapped(&self, t: f32, config: &BehaviorConfig) -> Vec2 {
        let s = self.spawn;
        let a = config.olm_wander_amplitude;
        let w = self.wander_speed;
        let x = s.x + config.olm_drift.x * t + ((w * t + s.z).sin() - s.z.sin()) * a;
        let z = s.z + config.olm_drift.y * t + ((w * t + s.x).cos() - s.x.cos()) * a;
        Vec2::new(x, z) + self.shift
    }

    /// Position at `t`, wrapping across the crawl bounds. Mutates `shift`.
    pub fn advance(&mut self, t: f32, config: &BehaviorConfig) -> Vec3 {
        let raw = self.unwrapped(t, config);
        let (x, dx) = wrap(raw.x, config.olm_x_bounds);
        let (z, dz) = wrap(raw.y, config.olm_z_bounds);
        self.shift += Vec2::new(dx, dz);
        let y = config.olm_rest_height + (2.0 * t + self.spawn.x).sin() * config.olm_bob_amplitude;
        Vec3::new(x, y, z)
    }

    pub fn head_yaw(t: f32) -> f32 {
        (1.5 * t).sin() * 0.2
    }
}

/// Past the max bound snaps to min, past the min bound snaps to max.
/// Returns the wrapped value and the correction applied.
fn wrap(value: f32, bounds: Span) -> (f32, f32) {
    if value > bounds.max {
        (bounds.min, bounds.min - value)
    } else if value < bounds.min {
        (bounds.max, bounds.max - value)
    } else {
        (value, 0.0)
    }
}

/// Emissive intensity of a glowing object at `t`. Stays within [0.12, 0.20].
pub fn glow_intensity(t: f32, phase: f32) -> f32 {
    0.12 + (0.6 * t + phase).sin().abs() * 0.08
}

/// Advance every object's animation to absolute time `t` (seconds).
///
/// Writes positions and rotations only. Scale is left to the highlight
/// machine; emissive color is left alone, only its intensity pulses.
pub fn advance(population: &mut Population, t: f32, config: &BehaviorConfig) {
    let roots: Vec<NodeId> = population.roots().to_vec();
    for root in roots {
        let Some(node) = population.get_mut(root) else {
            continue;
        };
        match &mut node.behavior {
            Behavior::Static => {}
            Behavior::Glow => {
                let phase = node.spawn_position.x;
                for id in population.subtree(root) {
                    if let Some(visual) = population.get_mut(id).and_then(|n| n.visual.as_mut()) {
                        visual.material.emissive_intensity = glow_intensity(t, phase);
                    }
                }
            }
            Behavior::Bat(motion) => {
                let pose = motion.pose(t, config);
                node.transform.position = pose.position;
                node.transform.rotation = Quat::from_rotation_y(pose.yaw);
                let children = node.children.clone();
                for child in children {
                    let Some(part) = population.get_mut(child) else {
                        continue;
                    };
                    part.transform.rotation = match part.part {
                        Part::LeftWing => Quat::from_euler(EulerRot::XYZ, WING_TILT, 0.0, -pose.flap),
                        Part::RightWing => Quat::from_euler(EulerRot::XYZ, -WING_TILT, 0.0, pose.flap),
                        _ => continue,
                    };
                }
            }
            Behavior::Olm(motion) => {
                node.transform.position = motion.advance(t, config);
                let children = node.children.clone();
                for child in children {
                    if let Some(part) = population.get_mut(child) {
                        if part.part == Part::Head {
                            part.transform.rotation = Quat::from_rotation_y(OlmMotion::head_yaw(t));
                        }
                    }
                }
            }
        }
    }
}
