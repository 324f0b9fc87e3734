//! Contact normal estimation and cardinal snapping.

use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::error::GeometryError;
use crate::narrowphase::Narrowphase;
use crate::types::{Aabb, CardinalNormal, Tile};

impl CardinalNormal {
    /// Order in which candidates are compared while snapping. On equal dot
    /// products the earlier entry wins, so a 45° normal pointing up-right
    /// snaps to `Up`. Changing this order changes resolved trajectories.
    pub const EVALUATION_ORDER: [CardinalNormal; 4] =
        [CardinalNormal::Up, CardinalNormal::Left, CardinalNormal::Right, CardinalNormal::Down];

    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        match self {
            CardinalNormal::Up => Vec2::Y,
            CardinalNormal::Left => Vec2::NEG_X,
            CardinalNormal::Right => Vec2::X,
            CardinalNormal::Down => Vec2::NEG_Y,
        }
    }

    /// Nearest cardinal to `raw` by dot product. `None` for a zero or
    /// non-finite normal.
    pub fn snap(raw: Vec2) -> Option<Self> {
        let n = raw.try_normalize()?;
        let mut best = Self::EVALUATION_ORDER[0];
        let mut best_dot = n.dot(best.to_vec2());
        for cand in &Self::EVALUATION_ORDER[1..] {
            let d = n.dot(cand.to_vec2());
            if d > best_dot {
                best = *cand;
                best_dot = d;
            }
        }
        Some(best)
    }

    /// Signed overlap along this normal's axis between an actor box centered
    /// at `actor_center` and `tile`. Positive means the actor sits inside the
    /// tile on the face this normal points out of.
    pub fn penetration(self, actor_center: Vec2, actor_half: Vec2, tile: &Aabb) -> f32 {
        let c = tile.center;
        let h = tile.half_extents;
        match self {
            CardinalNormal::Up => (c.y + h.y) - (actor_center.y - actor_half.y),
            CardinalNormal::Down => (actor_center.y + actor_half.y) - (c.y - h.y),
            CardinalNormal::Right => (c.x + h.x) - (actor_center.x - actor_half.x),
            CardinalNormal::Left => (actor_center.x + actor_half.x) - (c.x - h.x),
        }
    }
}

/// Surface normal of `tile` under `point`, found by probing from just outside
/// `point` toward the tile center.
pub fn estimate_contact_normal(point: Vec2, tile: &Tile, skin: f32) -> Result<Vec2, GeometryError> {
    let degenerate = GeometryError::DegenerateHit { tile: tile.id, point };
    let center = tile.aabb.center;
    let dir = (center - point).try_normalize().ok_or(degenerate)?;
    let start = point - dir * skin;
    match Narrowphase::line_segment_aabb(start, center, tile.aabb.min(), tile.aabb.max()) {
        Some(hit) if hit.normal != Vec2::ZERO => Ok(hit.normal),
        _ => Err(degenerate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TileGroup, TileId};
    use proptest::prelude::*;

    fn unit_tile(center: Vec2) -> Tile {
        Tile {
            id: TileId(7),
            key: 7,
            group: TileGroup::Static,
            aabb: Aabb::new(center, Vec2::splat(0.5)),
        }
    }

    #[test]
    fn test_snap_axis_aligned() {
        assert_eq!(CardinalNormal::snap(Vec2::new(0.1, 2.0)), Some(CardinalNormal::Up));
        assert_eq!(CardinalNormal::snap(Vec2::new(-3.0, 0.2)), Some(CardinalNormal::Left));
        assert_eq!(CardinalNormal::snap(Vec2::new(1.0, -0.9)), Some(CardinalNormal::Right));
        assert_eq!(CardinalNormal::snap(Vec2::new(0.2, -1.0)), Some(CardinalNormal::Down));
    }

    #[test]
    fn test_snap_diagonal_ties_follow_evaluation_order() {
        assert_eq!(CardinalNormal::snap(Vec2::new(0.7071, 0.7071)), Some(CardinalNormal::Up));
        assert_eq!(CardinalNormal::snap(Vec2::new(-0.7071, 0.7071)), Some(CardinalNormal::Up));
        assert_eq!(CardinalNormal::snap(Vec2::new(0.7071, -0.7071)), Some(CardinalNormal::Right));
        assert_eq!(CardinalNormal::snap(Vec2::new(-0.7071, -0.7071)), Some(CardinalNormal::Left));
    }

    #[test]
    fn test_snap_zero_is_neutral() {
        assert_eq!(CardinalNormal::snap(Vec2::ZERO), None);
        assert_eq!(CardinalNormal::snap(Vec2::new(f32::NAN, 1.0)), None);
    }

    #[test]
    fn test_estimate_left_face() {
        let tile = unit_tile(Vec2::new(1.8, 0.0));
        let n = estimate_contact_normal(Vec2::new(1.3, 0.2), &tile, 0.05).unwrap();
        assert_eq!(n, Vec2::NEG_X);
    }

    #[test]
    fn test_estimate_top_face_from_shallow_penetration() {
        let tile = unit_tile(Vec2::ZERO);
        let n = estimate_contact_normal(Vec2::new(0.1, 0.49), &tile, 0.05).unwrap();
        assert_eq!(n, Vec2::Y);
    }

    #[test]
    fn test_estimate_at_center_is_degenerate() {
        let tile = unit_tile(Vec2::ZERO);
        let err = estimate_contact_normal(Vec2::ZERO, &tile, 0.05).unwrap_err();
        assert_eq!(err, GeometryError::DegenerateHit { tile: TileId(7), point: Vec2::ZERO });
    }

    #[test]
    fn test_estimate_deep_inside_is_degenerate() {
        let tile = unit_tile(Vec2::ZERO);
        assert!(estimate_contact_normal(Vec2::new(0.2, 0.1), &tile, 0.05).is_err());
    }

    #[test]
    fn test_penetration_per_face() {
        let tile = Aabb::new(Vec2::new(1.8, 0.0), Vec2::splat(0.5));
        let half = Vec2::splat(0.5);
        assert!((CardinalNormal::Left.penetration(Vec2::new(1.0, 0.0), half, &tile) - 0.2).abs() < 1e-5);
        assert!(CardinalNormal::Left.penetration(Vec2::new(0.5, 0.0), half, &tile) < 0.0);
        let floor = Aabb::new(Vec2::ZERO, Vec2::splat(0.5));
        assert!((CardinalNormal::Up.penetration(Vec2::new(0.0, 0.9), half, &floor) - 0.1).abs() < 1e-5);
        assert!((CardinalNormal::Down.penetration(Vec2::new(0.0, -0.8), half, &floor) - 0.2).abs() < 1e-5);
        assert!((CardinalNormal::Right.penetration(Vec2::new(0.7, 0.0), half, &floor) - 0.3).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_snap_is_max_dot(x in -10.0f32..10.0, y in -10.0f32..10.0) {
            let raw = Vec2::new(x, y);
            prop_assume!(raw.length() > 1e-3);
            let n = raw.normalize();
            let snapped = CardinalNormal::snap(raw).unwrap();
            let best = n.dot(snapped.to_vec2());
            let rank = CardinalNormal::EVALUATION_ORDER.iter().position(|c| *c == snapped).unwrap();
            for (i, cand) in CardinalNormal::EVALUATION_ORDER.iter().enumerate() {
                let d = n.dot(cand.to_vec2());
                prop_assert!(d <= best);
                // Ties go to the earliest entry
                if i < rank {
                    prop_assert!(d < best);
                }
            }
        }
    }
}
