//! Shared types and configuration for the cavern workspace.

pub mod config;
pub mod types;

pub use config::{
    BehaviorConfig, CaveConfig, ConfigError, CountRange, Extent, InteractionConfig,
    PopulationConfig, Span,
};
pub use types::{Color, Metadata, NodeId, ObjectKind, Transform};
