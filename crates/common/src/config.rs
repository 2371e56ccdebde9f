//! Session configuration.
//!
//! Every field has a default matching the reference cave, so an empty YAML
//! document (or no file at all) yields the standard layout.

use crate::types::{Color, ObjectKind};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Closed scalar interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }
}

/// Inclusive integer count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Axis-aligned world-space box `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: Vec3,
    pub max: Vec3,
}

impl Extent {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Counts, placement areas and attachment odds for the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    pub stalagmite_count: u32,
    pub spikes_per_stalagmite: CountRange,
    pub floor_cluster_count: u32,
    pub shards_per_cluster: CountRange,
    pub stalactite_count: u32,
    pub ceiling_crystal_chance: f32,
    pub fungus_chance: f32,
    pub bacteria_count: u32,
    pub bat_count: u32,
    pub olm_count: u32,

    /// Where stalagmite bases are placed.
    pub stalagmite_area: Extent,
    pub floor_cluster_area: Extent,
    pub stalactite_area: Extent,
    pub bacteria_area: Extent,
    /// Spawn volume for bats.
    pub flight_volume: Extent,
    /// Spawn area for olms.
    pub crawl_area: Extent,

    /// Bounds every floor-level object must stay within, attachments included.
    pub floor_band: Extent,
    pub ceiling_band: Extent,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            stalagmite_count: 12,
            spikes_per_stalagmite: CountRange::new(4, 8),
            floor_cluster_count: 8,
            shards_per_cluster: CountRange::new(3, 6),
            stalactite_count: 60,
            ceiling_crystal_chance: 0.4,
            fungus_chance: 0.3,
            bacteria_count: 20,
            bat_count: 8,
            olm_count: 6,
            stalagmite_area: Extent::new(Vec3::new(-15.0, -0.2, -25.0), Vec3::new(15.0, -0.2, -5.0)),
            floor_cluster_area: Extent::new(
                Vec3::new(-12.0, -0.4, -26.0),
                Vec3::new(12.0, -0.4, -6.0),
            ),
            stalactite_area: Extent::new(Vec3::new(-15.0, 13.0, -25.0), Vec3::new(15.0, 14.5, -5.0)),
            bacteria_area: Extent::new(Vec3::new(-15.0, -1.05, -25.0), Vec3::new(15.0, -1.0, -5.0)),
            flight_volume: Extent::new(Vec3::new(-8.0, 1.2, -16.0), Vec3::new(8.0, 2.6, -4.0)),
            crawl_area: Extent::new(Vec3::new(-6.0, -0.2, -12.0), Vec3::new(6.0, -0.2, -3.0)),
            floor_band: Extent::new(Vec3::new(-16.0, -1.1, -26.0), Vec3::new(16.0, 0.0, -4.0)),
            ceiling_band: Extent::new(Vec3::new(-16.0, 12.5, -26.0), Vec3::new(16.0, 15.0, -4.0)),
        }
    }
}

impl PopulationConfig {
    /// The extents an object of `kind` may be placed in at generation time.
    pub fn allowed_extents(&self, kind: ObjectKind) -> Vec<Extent> {
        match kind {
            ObjectKind::Mineral => vec![self.floor_band, self.ceiling_band],
            ObjectKind::Fungi => vec![self.ceiling_band],
            ObjectKind::Bacteria => vec![self.floor_band],
            ObjectKind::Bat => vec![self.flight_volume],
            ObjectKind::Olm => vec![self.crawl_area],
        }
    }
}

/// Tuning for creature motion and the olm wraparound bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub bat_hover_height: f32,
    pub bat_bob_amplitude: f32,
    pub bat_drift_amplitude: f32,
    /// Yaw rate in radians per second.
    pub bat_yaw_rate: f32,
    pub olm_x_bounds: Span,
    /// Olms exit past `max` and re-enter at `min`.
    pub olm_z_bounds: Span,
    /// Constant drift in world units per second (x, z).
    pub olm_drift: Vec2,
    pub olm_wander_amplitude: f32,
    pub olm_rest_height: f32,
    pub olm_bob_amplitude: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            bat_hover_height: 1.5,
            bat_bob_amplitude: 0.5,
            bat_drift_amplitude: 2.0,
            bat_yaw_rate: 0.6,
            olm_x_bounds: Span::new(-12.0, 12.0),
            olm_z_bounds: Span::new(-12.0, 0.0),
            olm_drift: Vec2::new(0.15, 0.1),
            olm_wander_amplitude: 1.5,
            olm_rest_height: -0.2,
            olm_bob_amplitude: 0.05,
        }
    }
}

/// Torch aim, highlight and selection-pulse tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Distance along the pointer ray of the raw aim target.
    pub aim_distance: f32,
    /// Fraction of the remaining distance the aim point covers each frame.
    pub aim_lerp: f32,
    pub torch_lerp: f32,
    pub torch_height: f32,
    pub hover_scale: f32,
    pub hover_emissive: Color,
    pub acquire_emissive_lerp: f32,
    pub acquire_scale_lerp: f32,
    pub release_lerp: f32,
    pub pulse_factor: f32,
    pub pulse_delay_secs: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            aim_distance: 6.0,
            aim_lerp: 0.6,
            torch_lerp: 0.25,
            torch_height: 0.6,
            hover_scale: 1.08,
            hover_emissive: Color::from_hex(0x222222),
            acquire_emissive_lerp: 0.25,
            acquire_scale_lerp: 0.1,
            release_lerp: 0.08,
            pulse_factor: 1.18,
            pulse_delay_secs: 0.26,
        }
    }
}

/// Top-level configuration for a cave session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    pub population: PopulationConfig,
    pub behavior: BehaviorConfig,
    pub interaction: InteractionConfig,
}

impl CaveConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: CaveConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&data)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded cave config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.population;
        check_count("population.spikes_per_stalagmite", p.spikes_per_stalagmite)?;
        check_count("population.shards_per_cluster", p.shards_per_cluster)?;
        check_chance("population.ceiling_crystal_chance", p.ceiling_crystal_chance)?;
        check_chance("population.fungus_chance", p.fungus_chance)?;
        for (field, extent) in [
            ("population.stalagmite_area", p.stalagmite_area),
            ("population.floor_cluster_area", p.floor_cluster_area),
            ("population.stalactite_area", p.stalactite_area),
            ("population.bacteria_area", p.bacteria_area),
            ("population.flight_volume", p.flight_volume),
            ("population.crawl_area", p.crawl_area),
            ("population.floor_band", p.floor_band),
            ("population.ceiling_band", p.ceiling_band),
        ] {
            if !extent.min.cmple(extent.max).all() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("min {} exceeds max {}", extent.min, extent.max),
                });
            }
        }

        let b = &self.behavior;
        for (field, span) in [
            ("behavior.olm_x_bounds", b.olm_x_bounds),
            ("behavior.olm_z_bounds", b.olm_z_bounds),
        ] {
            if !(span.width() > 0.0 && span.width().is_finite()) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("empty range {}..{}", span.min, span.max),
                });
            }
        }

        let i = &self.interaction;
        for (field, factor) in [
            ("interaction.aim_lerp", i.aim_lerp),
            ("interaction.torch_lerp", i.torch_lerp),
            ("interaction.acquire_emissive_lerp", i.acquire_emissive_lerp),
            ("interaction.acquire_scale_lerp", i.acquire_scale_lerp),
            ("interaction.release_lerp", i.release_lerp),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("interpolation factor {factor} outside (0, 1]"),
                });
            }
        }
        for (field, value) in [
            ("interaction.aim_distance", i.aim_distance),
            ("interaction.hover_scale", i.hover_scale),
            ("interaction.pulse_factor", i.pulse_factor),
        ] {
            check_positive(field, value)?;
        }
        if !(i.pulse_delay_secs.is_finite() && i.pulse_delay_secs >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "interaction.pulse_delay_secs",
                reason: format!("delay {} must be finite and non-negative", i.pulse_delay_secs),
            });
        }
        if !i.torch_height.is_finite() {
            return Err(ConfigError::Invalid {
                field: "interaction.torch_height",
                reason: "not a finite number".into(),
            });
        }
        Ok(())
    }
}

fn check_count(field: &'static str, range: CountRange) -> Result<(), ConfigError> {
    if range.min > range.max {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("min {} exceeds max {}", range.min, range.max),
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be finite and positive"),
        });
    }
    Ok(())
}

fn check_chance(field: &'static str, chance: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&chance) {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("probability {chance} outside [0, 1]"),
        });
    }
    Ok(())
}
