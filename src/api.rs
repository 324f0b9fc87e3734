use glam::Vec2;

use crate::collider::BoxCollider;
use crate::config::LevelConfig;
use crate::desc::TileDesc;
use crate::error::ConfigurationError;
use crate::types::*;

/// Public API contract for the level authority: tile registry, active-group
/// toggle and the queries the actor runs against them.
pub trait LevelApi {
    /// Construct an empty level with the given configuration.
    fn new(cfg: LevelConfig) -> Self
    where
        Self: Sized;

    // --- Load ----------------------------------------------------------------

    /// Register every tile once, partitioned by group. Ids are assigned in
    /// order: A list, then B list, then the static list.
    fn register_tiles(
        &mut self,
        group_a: &[TileDesc],
        group_b: &[TileDesc],
        group_static: &[TileDesc],
    ) -> Result<(), ConfigurationError>;

    // --- Active group ----------------------------------------------------------

    /// Swap which dynamic group is solid. Static tiles are unaffected.
    fn flip(&mut self);

    fn active_group(&self) -> ActiveGroup;

    fn tile(&self, id: TileId) -> Option<&Tile>;

    // --- Queries ---------------------------------------------------------------

    /// Tiles the shape would strike moving from `current` to `next`, nearest
    /// to the line of travel first. The result is retained for `is_colliding`.
    fn find_colliding_tiles(
        &mut self,
        shape: &BoxCollider,
        current: Vec2,
        next: Vec2,
    ) -> &[TileCollision];

    /// Whether `tile` was part of the last `find_colliding_tiles` result.
    fn is_colliding(&self, tile: TileId) -> bool;

    /// Drop hits against tiles of the inactive group.
    fn filter_collisions(&self, raw: &[CastHit]) -> Vec<CastHit>;

    /// Cast against every registered tile regardless of group.
    fn cast_all(
        &self,
        shape: &BoxCollider,
        origin: Vec2,
        dir: Vec2,
        max_distance: f32,
    ) -> Vec<CastHit>;

    /// Closest solid tile along a ray.
    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(TileId, RayHit)>;
}

/// Box primitives the casts are built from.
pub trait NarrowphaseApi {
    // Rays / segments -------------------------------------------------------

    fn ray_aabb(origin: Vec2, dir: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<RayHit>;
    fn line_segment_aabb(a: Vec2, b: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<RayHit>;

    // Overlaps --------------------------------------------------------------

    fn overlap_aabb_aabb(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Option<Overlap>;

    // Sweeps ----------------------------------------------------------------

    /// Box `c0/h0` displaced by `delta` against the static box `c1/h1`.
    fn sweep_aabb_aabb(c0: Vec2, h0: Vec2, delta: Vec2, c1: Vec2, h1: Vec2) -> Option<SweepHit>;
}
