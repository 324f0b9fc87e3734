//! Error taxonomy.
//!
//! Only load-time configuration problems leave the core. Geometry problems
//! found while stepping are recovered inside the resolver and reported
//! through logging and the diagnostics sink.

use glam::Vec2;
use thiserror::Error;

use crate::types::{TileGroup, TileKey, TileId};

/// Fatal problems found while loading a level or its configuration.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("tile {key} registered in both {first:?} and {second:?}")]
    DuplicateTile {
        key: TileKey,
        first: TileGroup,
        second: TileGroup,
    },

    #[error("tile {key} has an unusable collision shape (half extents {half_extents})")]
    InvalidShape { key: TileKey, half_extents: Vec2 },

    #[error("tiles are already registered for this level")]
    AlreadyRegistered,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unknown tile glyph {glyph:?} at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },

    #[error("level layout has no spawn point")]
    MissingSpawn,
}

/// Recoverable narrow-phase failures.
#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("normal probe from {point} did not strike {tile}")]
    DegenerateHit { tile: TileId, point: Vec2 },
}
