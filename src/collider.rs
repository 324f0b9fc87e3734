//! Shape-cast query primitive for the actor's box.

use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::narrowphase::Narrowphase;
use crate::types::{Aabb, CastHit, Tile};

/// Axis-aligned box shape, positioned per query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoxCollider {
    pub half_extents: Vec2,
}

impl BoxCollider {
    pub fn new(half_extents: Vec2) -> Self {
        Self { half_extents }
    }

    /// Shape of a `width` x `height` box.
    pub fn from_size(size: Vec2) -> Self {
        Self::new(size * 0.5)
    }

    pub fn at(&self, center: Vec2) -> Aabb {
        Aabb::new(center, self.half_extents)
    }

    /// Sweep this box from `origin` along `dir` for up to `max_distance` and
    /// report every target it touches, in target order. `dir` need not be
    /// normalized. A zero direction or distance casts nothing.
    pub fn cast<'a, I>(&self, origin: Vec2, dir: Vec2, max_distance: f32, targets: I) -> Vec<CastHit>
    where
        I: IntoIterator<Item = &'a Tile>,
    {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance.is_nan() || max_distance <= 0.0 {
            return Vec::new();
        }
        let delta = dir * max_distance;
        targets
            .into_iter()
            .filter_map(|tile| self.cast_one(origin, delta, max_distance, tile))
            .collect()
    }

    /// Single-target variant of [`BoxCollider::cast`].
    pub fn cast_tile(&self, origin: Vec2, dir: Vec2, max_distance: f32, tile: &Tile) -> Option<CastHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance.is_nan() || max_distance <= 0.0 {
            return None;
        }
        self.cast_one(origin, dir * max_distance, max_distance, tile)
    }

    fn cast_one(&self, origin: Vec2, delta: Vec2, max_distance: f32, tile: &Tile) -> Option<CastHit> {
        let hit = Narrowphase::sweep_aabb_aabb(
            origin,
            self.half_extents,
            delta,
            tile.aabb.center,
            tile.aabb.half_extents,
        )?;
        Some(CastHit {
            tile: tile.id,
            point: hit.contact,
            normal: hit.normal,
            distance: hit.toi * max_distance,
        })
    }
}
