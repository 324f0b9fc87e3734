//! Load-time level descriptors handed over by a scene loader.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::types::{TileGroup, TileKey};

/// One tile as authored. `key` must be unique across the whole level.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileDesc {
    pub key: TileKey,
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl TileDesc {
    pub fn new(key: TileKey, center: Vec2, half_extents: Vec2) -> Self {
        Self { key, center, half_extents }
    }
}

/// Full level contents, partitioned by group container.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDesc {
    pub group_a: Vec<TileDesc>,
    pub group_b: Vec<TileDesc>,
    pub group_static: Vec<TileDesc>,
    pub spawn: Vec2,
}

impl LevelDesc {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a level from a character grid, one cell per `tile_size` units.
    ///
    /// `A`/`B`/`#` place group A, group B and static tiles, `@` is the spawn
    /// point, `.` and spaces are empty. The first line is the top row; the
    /// bottom-left cell is centered at `(tile_size / 2, tile_size / 2)`.
    /// Keys are `row * width + col` counted from the top-left.
    pub fn from_ascii(map: &str, tile_size: f32) -> Result<Self, ConfigurationError> {
        let rows: Vec<&str> = map.lines().map(str::trim_end).filter(|l| !l.is_empty()).collect();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let height = rows.len();
        let half = Vec2::splat(tile_size * 0.5);

        let mut desc = LevelDesc::default();
        let mut spawn = None;
        for (row, line) in rows.iter().enumerate() {
            let y = (height - 1 - row) as f32 * tile_size + half.y;
            for (col, glyph) in line.chars().enumerate() {
                let center = Vec2::new(col as f32 * tile_size + half.x, y);
                let key = (row * width + col) as TileKey;
                let group = match glyph {
                    'A' => TileGroup::A,
                    'B' => TileGroup::B,
                    '#' => TileGroup::Static,
                    '@' => {
                        spawn = Some(center);
                        continue;
                    }
                    '.' | ' ' => continue,
                    _ => return Err(ConfigurationError::UnknownGlyph { glyph, row, col }),
                };
                let tile = TileDesc::new(key, center, half);
                match group {
                    TileGroup::A => desc.group_a.push(tile),
                    TileGroup::B => desc.group_b.push(tile),
                    TileGroup::Static => desc.group_static.push(tile),
                }
            }
        }
        desc.spawn = spawn.ok_or(ConfigurationError::MissingSpawn)?;
        Ok(desc)
    }
}
