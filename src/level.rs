use glam::Vec2;

use std::collections::{HashMap, HashSet};

use crate::api::{LevelApi, NarrowphaseApi};
use crate::collider::BoxCollider;
use crate::config::LevelConfig;
use crate::contact::estimate_contact_normal;
use crate::desc::TileDesc;
use crate::error::ConfigurationError;
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// Skin used when estimating the normal stored on broad-phase candidates.
const CANDIDATE_NORMAL_SKIN: f32 = 0.05;
const QUERY_PAD: f32 = 1e-3;

/// Tile registry and active-group authority.
///
/// Tiles are binned once into a uniform grid at registration; queries walk
/// the grid and then restore registration order, so results match a linear
/// scan over `(active group) ∪ static`.
pub struct Level {
    pub cfg: LevelConfig,

    tiles: Vec<Tile>,
    // Per-group id lists, registration order
    group_a: Vec<TileId>,
    group_b: Vec<TileId>,
    group_static: Vec<TileId>,

    active: ActiveGroup,
    registered: bool,

    // Uniform grid: cell coord -> tile ids
    grid: HashMap<(i32, i32), Vec<TileId>>,

    // Result of the most recent find_colliding_tiles
    last_collisions: Vec<TileCollision>,
}

/// Tile counts and grid occupancy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelStats {
    pub tiles_a: usize,
    pub tiles_b: usize,
    pub tiles_static: usize,
    pub cells: usize,
    pub last_collisions: usize,
}

impl LevelApi for Level {
    fn new(cfg: LevelConfig) -> Self {
        Self {
            cfg,
            tiles: Vec::new(),
            group_a: Vec::new(),
            group_b: Vec::new(),
            group_static: Vec::new(),
            active: ActiveGroup::A,
            registered: false,
            grid: HashMap::new(),
            last_collisions: Vec::new(),
        }
    }

    fn register_tiles(
        &mut self,
        group_a: &[TileDesc],
        group_b: &[TileDesc],
        group_static: &[TileDesc],
    ) -> Result<(), ConfigurationError> {
        if self.registered {
            return Err(ConfigurationError::AlreadyRegistered);
        }

        // Validate everything before touching state
        let mut seen: HashMap<TileKey, TileGroup> = HashMap::new();
        let lists = [(TileGroup::A, group_a), (TileGroup::B, group_b), (TileGroup::Static, group_static)];
        for (group, list) in lists {
            for d in list {
                let h = d.half_extents;
                if !(h.is_finite() && h.x > 0.0 && h.y > 0.0 && d.center.is_finite()) {
                    return Err(ConfigurationError::InvalidShape { key: d.key, half_extents: h });
                }
                if let Some(first) = seen.insert(d.key, group) {
                    return Err(ConfigurationError::DuplicateTile { key: d.key, first, second: group });
                }
            }
        }

        for (group, list) in lists {
            for d in list {
                let id = TileId(self.tiles.len() as u32);
                self.tiles.push(Tile {
                    id,
                    key: d.key,
                    group,
                    aabb: Aabb::new(d.center, d.half_extents),
                });
                match group {
                    TileGroup::A => self.group_a.push(id),
                    TileGroup::B => self.group_b.push(id),
                    TileGroup::Static => self.group_static.push(id),
                }
            }
        }
        for i in 0..self.tiles.len() {
            let aabb = self.tiles[i].aabb;
            self.insert_into_grid(TileId(i as u32), aabb.min(), aabb.max());
        }
        self.registered = true;

        log::info!(
            "level loaded: {} tiles (A: {}, B: {}, static: {}) in {} cells",
            self.tiles.len(),
            self.group_a.len(),
            self.group_b.len(),
            self.group_static.len(),
            self.grid.len()
        );
        Ok(())
    }

    fn flip(&mut self) {
        self.active = self.active.toggled();
        log::debug!("active group is now {:?}", self.active);
    }

    fn active_group(&self) -> ActiveGroup {
        self.active
    }

    fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0 as usize)
    }

    fn find_colliding_tiles(
        &mut self,
        shape: &BoxCollider,
        current: Vec2,
        next: Vec2,
    ) -> &[TileCollision] {
        self.last_collisions.clear();

        let sweep = next - current;
        let Some(dir) = sweep.try_normalize() else {
            return &self.last_collisions;
        };
        let length = sweep.length();

        let (min, max) = shape.at(current).swept(sweep);
        for id in self.candidates_in(min, max) {
            let tile = self.tiles[id.0 as usize];
            if !self.active.admits(tile.group) {
                continue;
            }
            let Some(hit) = shape.cast_tile(current, dir, length, &tile) else {
                continue;
            };

            let along = (tile.aabb.center - current).dot(dir);
            if along < -reach_behind(dir, shape.half_extents, tile.aabb.half_extents) {
                // Wholly behind the actor's trailing edge
                continue;
            }
            let projected = current + dir * along;
            let projected_distance = tile.aabb.center.distance_squared(projected);

            let normal = estimate_contact_normal(hit.point, &tile, CANDIDATE_NORMAL_SKIN)
                .ok()
                .and_then(CardinalNormal::snap)
                .or_else(|| CardinalNormal::snap(hit.normal))
                .or_else(|| CardinalNormal::snap(-dir))
                .unwrap_or(CardinalNormal::Up);

            self.last_collisions.push(TileCollision {
                tile,
                projected_distance,
                normal,
                hit_point: hit.point,
                hit_distance: hit.distance,
            });
        }

        // Stable: equal distances keep registration order
        self.last_collisions
            .sort_by(|a, b| a.projected_distance.total_cmp(&b.projected_distance));
        &self.last_collisions
    }

    fn is_colliding(&self, tile: TileId) -> bool {
        self.last_collisions.iter().any(|c| c.tile.id == tile)
    }

    fn filter_collisions(&self, raw: &[CastHit]) -> Vec<CastHit> {
        raw.iter().copied().filter(|h| self.is_tile_active(h.tile)).collect()
    }

    fn cast_all(
        &self,
        shape: &BoxCollider,
        origin: Vec2,
        dir: Vec2,
        max_distance: f32,
    ) -> Vec<CastHit> {
        let unit = dir.normalize_or_zero();
        if unit == Vec2::ZERO || max_distance.is_nan() || max_distance <= 0.0 {
            return Vec::new();
        }
        let (min, max) = shape.at(origin).swept(unit * max_distance);
        let ids = self.candidates_in(min, max);
        shape.cast(origin, dir, max_distance, ids.iter().map(|id| &self.tiles[id.0 as usize]))
    }

    fn raycast(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(TileId, RayHit)> {
        let dir = dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }
        let cs = self.cell_size();
        // Setup DDA
        let mut best: Option<(TileId, RayHit)> = None;
        let mut tested: HashSet<TileId> = HashSet::new();

        let mut cell = world_to_cell(origin, cs);
        let step_x = if dir.x > 0.0 { 1 } else if dir.x < 0.0 { -1 } else { 0 };
        let step_y = if dir.y > 0.0 { 1 } else if dir.y < 0.0 { -1 } else { 0 };
        let next_boundary = |c: i32, step: i32| -> f32 {
            if step > 0 { (c as f32 + 1.0) * cs } else { c as f32 * cs }
        };
        let mut t_max_x = if step_x != 0 { (next_boundary(cell.0, step_x) - origin.x) / dir.x } else { f32::INFINITY };
        let mut t_max_y = if step_y != 0 { (next_boundary(cell.1, step_y) - origin.y) / dir.y } else { f32::INFINITY };
        let t_delta_x = if step_x != 0 { cs / dir.x.abs() } else { f32::INFINITY };
        let t_delta_y = if step_y != 0 { cs / dir.y.abs() } else { f32::INFINITY };

        let mut t_curr = 0.0f32;
        for _ in 0..10_000 { // safety cap
            if t_curr > max_distance {
                break;
            }
            // A hit closer than the current cell entry cannot be beaten
            if matches!(best, Some((_, h)) if h.toi < t_curr) {
                break;
            }
            if let Some(list) = self.grid.get(&cell) {
                for &id in list {
                    if !tested.insert(id) {
                        continue;
                    }
                    let tile = &self.tiles[id.0 as usize];
                    if !self.active.admits(tile.group) {
                        continue;
                    }
                    let Some(h) = Narrowphase::ray_aabb(origin, dir, tile.aabb.min(), tile.aabb.max()) else {
                        continue;
                    };
                    if h.toi > max_distance {
                        continue;
                    }
                    match &best {
                        // Ties go to the earlier-registered tile
                        Some((bid, bh)) if h.toi > bh.toi || (h.toi == bh.toi && id > *bid) => {}
                        _ => best = Some((id, h)),
                    }
                }
            }

            if t_max_x < t_max_y {
                cell.0 += step_x;
                t_curr = t_max_x;
                t_max_x += t_delta_x;
            } else {
                cell.1 += step_y;
                t_curr = t_max_y;
                t_max_y += t_delta_y;
            }
        }
        best
    }
}

impl Level {
    /// Build a level and register `desc`'s tiles in one go.
    pub fn load(cfg: LevelConfig, desc: &crate::desc::LevelDesc) -> Result<Self, ConfigurationError> {
        let mut level = <Self as LevelApi>::new(cfg);
        level.register_tiles(&desc.group_a, &desc.group_b, &desc.group_static)?;
        Ok(level)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_by_key(&self, key: TileKey) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.key == key)
    }

    /// Tiles of one group, registration order.
    pub fn group_tiles(&self, group: TileGroup) -> impl Iterator<Item = &Tile> + '_ {
        let ids = match group {
            TileGroup::A => &self.group_a,
            TileGroup::B => &self.group_b,
            TileGroup::Static => &self.group_static,
        };
        ids.iter().map(|id| &self.tiles[id.0 as usize])
    }

    /// Whether tiles of `group` are currently solid. Drives tile tinting.
    pub fn is_group_active(&self, group: TileGroup) -> bool {
        self.active.admits(group)
    }

    pub fn is_tile_active(&self, id: TileId) -> bool {
        self.tile(id).is_some_and(|t| self.active.admits(t.group))
    }

    pub fn last_collisions(&self) -> &[TileCollision] {
        &self.last_collisions
    }

    pub fn stats(&self) -> LevelStats {
        LevelStats {
            tiles_a: self.group_a.len(),
            tiles_b: self.group_b.len(),
            tiles_static: self.group_static.len(),
            cells: self.grid.len(),
            last_collisions: self.last_collisions.len(),
        }
    }

    fn cell_size(&self) -> f32 {
        self.cfg.cell_size.max(1e-5)
    }

    fn insert_into_grid(&mut self, id: TileId, min: Vec2, max: Vec2) {
        let cs = self.cell_size();
        let (ix0, iy0) = world_to_cell(min, cs);
        let (ix1, iy1) = world_to_cell(max, cs);
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                self.grid.entry((ix, iy)).or_default().push(id);
            }
        }
    }

    /// Ids of every tile whose cells intersect `min..max`, ascending.
    fn candidates_in(&self, min: Vec2, max: Vec2) -> Vec<TileId> {
        let cs = self.cell_size();
        // Pad so tiles touching the swept bounds are never missed
        let (ix0, iy0) = world_to_cell(min - Vec2::splat(QUERY_PAD), cs);
        let (ix1, iy1) = world_to_cell(max + Vec2::splat(QUERY_PAD), cs);
        let span = (ix1 as i64 - ix0 as i64 + 1) * (iy1 as i64 - iy0 as i64 + 1);
        if span > self.grid.len() as i64 {
            // Sweep covers more cells than are occupied
            return (0..self.tiles.len() as u32).map(TileId).collect();
        }
        let mut out = Vec::new();
        for iy in iy0..=iy1 {
            for ix in ix0..=ix1 {
                if let Some(list) = self.grid.get(&(ix, iy)) {
                    out.extend_from_slice(list);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// How far behind the actor, along `dir`, a tile center can sit while the
/// two boxes still overlap on the travel axis.
fn reach_behind(dir: Vec2, actor_half: Vec2, tile_half: Vec2) -> f32 {
    dir.abs().dot(actor_half + tile_half)
}

fn world_to_cell(p: Vec2, cs: f32) -> (i32, i32) {
    ((p.x / cs).floor() as i32, (p.y / cs).floor() as i32)
}
