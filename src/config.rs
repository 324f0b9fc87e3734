//! Tunables for the level, resolver and actor.
//!
//! Every struct deserializes with defaults for missing fields so a config
//! file only has to name what it changes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Fixed simulation timestep (50 Hz).
pub const FIXED_DT: f32 = 0.02;
/// Maximum fixed steps per rendered frame before dropping time.
pub const MAX_SUBSTEPS: u32 = 8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Broad-phase grid cell size in world units (typ. one tile).
    pub cell_size: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self { cell_size: 1.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Contacts farther than `proximity_factor * tile width` from the tile
    /// center are treated as grazing and ignored.
    pub proximity_factor: f32,
    /// How far outside the contact point the normal probe ray starts.
    pub normal_probe_skin: f32,
    /// Resolution passes per step. Stops early once a pass corrects nothing.
    pub max_passes: u32,
    /// Penetration tolerated before a contact counts as unresolved.
    pub penetration_slop: f32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            proximity_factor: 0.7,
            normal_probe_skin: 0.05,
            max_passes: 1,
            penetration_slop: 1e-4,
        }
    }
}

/// Actor tuning. Accelerations are in units/step per second, so they are
/// scaled by the fixed timestep once per step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Full width/height of the actor box.
    pub size: Vec2,
    pub move_acceleration: f32,
    /// Exponential decay rate of horizontal velocity without input.
    pub horizontal_damping: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    /// Per-axis velocity limit (units per step).
    pub max_velocity: Vec2,
    pub ground_probe_distance: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(0.8, 0.9),
            move_acceleration: 1.5,
            horizontal_damping: 10.0,
            gravity: 1.0,
            jump_impulse: 15.0,
            max_velocity: Vec2::new(0.25, 0.5),
            ground_probe_distance: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub fixed_dt: f32,
    pub max_substeps: u32,
    pub level: LevelConfig,
    pub resolver: ResolverConfig,
    pub actor: ActorConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: FIXED_DT,
            max_substeps: MAX_SUBSTEPS,
            level: LevelConfig::default(),
            resolver: ResolverConfig::default(),
            actor: ActorConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let cfg: SimConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        positive("fixed_dt", self.fixed_dt)?;
        if self.max_substeps == 0 {
            return Err(invalid("max_substeps must be at least 1"));
        }
        positive("level.cell_size", self.level.cell_size)?;
        positive("resolver.proximity_factor", self.resolver.proximity_factor)?;
        non_negative("resolver.normal_probe_skin", self.resolver.normal_probe_skin)?;
        non_negative("resolver.penetration_slop", self.resolver.penetration_slop)?;
        if self.resolver.max_passes == 0 {
            return Err(invalid("resolver.max_passes must be at least 1"));
        }
        let a = &self.actor;
        positive("actor.size.x", a.size.x)?;
        positive("actor.size.y", a.size.y)?;
        positive("actor.max_velocity.x", a.max_velocity.x)?;
        positive("actor.max_velocity.y", a.max_velocity.y)?;
        non_negative("actor.move_acceleration", a.move_acceleration)?;
        non_negative("actor.horizontal_damping", a.horizontal_damping)?;
        non_negative("actor.gravity", a.gravity)?;
        non_negative("actor.jump_impulse", a.jump_impulse)?;
        positive("actor.ground_probe_distance", a.ground_probe_distance)?;
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidConfig(msg.into())
}

fn positive(name: &str, v: f32) -> Result<(), ConfigurationError> {
    if v.is_finite() && v > 0.0 { Ok(()) } else { Err(invalid(format!("{name} must be positive, got {v}"))) }
}

fn non_negative(name: &str, v: f32) -> Result<(), ConfigurationError> {
    if v.is_finite() && v >= 0.0 { Ok(()) } else { Err(invalid(format!("{name} must be non-negative, got {v}"))) }
}
