use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// User-defined opaque key identifying a tile across loads (e.g. an editor id).
pub type TileKey = u64;

/// Level-local handle assigned at registration, in registration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileId({})", self.0)
    }
}

/// Centered axis-aligned box.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self { center, half_extents }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.half_extents.x * 2.0
    }

    /// Bounds covering this box over the whole displacement `delta`.
    pub fn swept(&self, delta: Vec2) -> (Vec2, Vec2) {
        let end = self.center + delta;
        (self.center.min(end) - self.half_extents, self.center.max(end) + self.half_extents)
    }
}

/// Which container a tile was loaded under.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileGroup {
    A,
    B,
    Static,
}

/// The toggleable half of the world currently treated as solid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActiveGroup {
    #[default]
    A,
    B,
}

impl ActiveGroup {
    pub fn toggled(self) -> Self {
        match self {
            ActiveGroup::A => ActiveGroup::B,
            ActiveGroup::B => ActiveGroup::A,
        }
    }

    /// Whether tiles of `group` are solid while this group is active.
    pub fn admits(self, group: TileGroup) -> bool {
        matches!(
            (self, group),
            (_, TileGroup::Static) | (ActiveGroup::A, TileGroup::A) | (ActiveGroup::B, TileGroup::B)
        )
    }
}

/// A registered static obstacle. Shape and group never change after load.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tile {
    pub id: TileId,
    pub key: TileKey,
    pub group: TileGroup,
    pub aabb: Aabb,
}

impl Tile {
    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.aabb.half_extents
    }
}

/// Kinematic state mutated by the resolver and committed by the actor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Body {
    pub position: Vec2,
    /// Displacement applied per fixed step.
    pub velocity: Vec2,
    pub half_extents: Vec2,
}

impl Body {
    /// Where the body's center lands if the current velocity is committed.
    #[inline]
    pub fn next_position(&self) -> Vec2 {
        self.position + self.velocity
    }
}

/// Ray query result.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the entry point (0 when the origin starts inside).
    pub toi: f32,
    /// Outward face normal at entry; (0,0) when the origin starts inside.
    pub normal: Vec2,
    pub point: Vec2,
}

/// Overlap contact result (discrete).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Overlap {
    /// Axis of least penetration, pointing from B into A.
    pub normal: Vec2,
    /// Penetration depth (≥ 0).
    pub depth: f32,
    pub contact: Vec2,
}

/// Sweep (time-of-impact) result for a moving box against a static one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepHit {
    /// Fraction in [0,1] of the displacement where first contact occurs.
    pub toi: f32,
    /// Normal at impact (points from B into A); (0,0) for a starting overlap.
    pub normal: Vec2,
    /// Center of the contact region between both boxes at `toi`.
    pub contact: Vec2,
}

/// One tile struck by a shape cast.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CastHit {
    pub tile: TileId,
    pub point: Vec2,
    pub normal: Vec2,
    /// Distance travelled along the cast direction before contact.
    pub distance: f32,
}

/// The four axis-aligned contact normals. Declaration order is the snapping
/// evaluation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CardinalNormal {
    Up,
    Left,
    Right,
    Down,
}

/// Broad-phase candidate handed from the level to the resolver.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileCollision {
    pub tile: Tile,
    /// Squared distance from the tile center to the line of travel.
    pub projected_distance: f32,
    pub normal: CardinalNormal,
    pub hit_point: Vec2,
    pub hit_distance: f32,
}

/// Grounded/airborne, decided by the downward probe each step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MotionState {
    #[default]
    Airborne,
    Grounded,
}

/// Discrete input signals sampled once per rendered frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump_requested: bool,
    pub reset_requested: bool,
}

impl FrameInput {
    /// -1, 0 or 1. Opposing keys cancel out.
    pub fn horizontal_axis(&self) -> f32 {
        match (self.move_left, self.move_right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
