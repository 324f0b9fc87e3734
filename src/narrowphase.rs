use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Box-only primitive tests.
pub struct Narrowphase;

/// Clip one slab axis. Returns false when the ray misses.
#[inline]
#[allow(clippy::too_many_arguments)]
fn clip_axis(
    origin: f32,
    dir: f32,
    min: f32,
    max: f32,
    axis_normal: Vec2,
    tmin: &mut f32,
    tmax: &mut f32,
    n_enter: &mut Vec2,
) -> bool {
    if dir.abs() < f32::EPSILON {
        // Parallel: touching the face still counts as inside the slab
        return origin >= min && origin <= max;
    }
    let inv = 1.0 / dir;
    let mut t1 = (min - origin) * inv;
    let mut t2 = (max - origin) * inv;
    let mut n = -axis_normal;
    if t1 > t2 {
        core::mem::swap(&mut t1, &mut t2);
        n = axis_normal;
    }
    if t1 > *tmin {
        *tmin = t1;
        *n_enter = n;
    }
    if t2 < *tmax {
        *tmax = t2;
    }
    *tmin <= *tmax
}

impl NarrowphaseApi for Narrowphase {
    fn ray_aabb(origin: Vec2, dir: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<RayHit> {
        let mut tmin = f32::NEG_INFINITY;
        let mut tmax = f32::INFINITY;
        let mut n_enter = Vec2::ZERO;

        if !clip_axis(origin.x, dir.x, aabb_min.x, aabb_max.x, Vec2::X, &mut tmin, &mut tmax, &mut n_enter) {
            return None;
        }
        if !clip_axis(origin.y, dir.y, aabb_min.y, aabb_max.y, Vec2::Y, &mut tmin, &mut tmax, &mut n_enter) {
            return None;
        }

        if tmin < 0.0 {
            // Origin inside (or on a face). Leaving through the boundary at
            // t == 0 is not a hit.
            if tmax <= 0.0 {
                return None;
            }
            return Some(RayHit { toi: 0.0, normal: Vec2::ZERO, point: origin });
        }
        Some(RayHit {
            toi: tmin,
            normal: n_enter,
            point: origin + dir * tmin,
        })
    }

    fn line_segment_aabb(a: Vec2, b: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<RayHit> {
        let hit = Self::ray_aabb(a, b - a, aabb_min, aabb_max)?;
        (hit.toi <= 1.0).then_some(hit)
    }

    fn overlap_aabb_aabb(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Option<Overlap> {
        let d = c1 - c0;
        let ox = (h0.x + h1.x) - d.x.abs();
        let oy = (h0.y + h1.y) - d.y.abs();
        if ox < 0.0 || oy < 0.0 {
            return None;
        }

        let (depth, normal) = if ox <= oy {
            let nx = if d.x >= 0.0 { -1.0 } else { 1.0 }; // from B into A
            (ox, Vec2::new(nx, 0.0))
        } else {
            let ny = if d.y >= 0.0 { -1.0 } else { 1.0 };
            (oy, Vec2::new(0.0, ny))
        };

        Some(Overlap {
            normal,
            depth,
            contact: contact_center(c0, h0, c1, h1),
        })
    }

    fn sweep_aabb_aabb(c0: Vec2, h0: Vec2, delta: Vec2, c1: Vec2, h1: Vec2) -> Option<SweepHit> {
        if delta.length_squared() <= f32::EPSILON * f32::EPSILON {
            return None;
        }
        // Minkowski sum: sweep the center point against the expanded box
        let expand = h0 + h1;
        let hit = Self::ray_aabb(c0, delta, c1 - expand, c1 + expand)?;
        if hit.toi > 1.0 {
            return None;
        }
        let center_at_hit = c0 + delta * hit.toi;
        Some(SweepHit {
            toi: hit.toi,
            normal: hit.normal,
            contact: contact_center(center_at_hit, h0, c1, h1),
        })
    }
}

/// Center of the intersection of two boxes. Collapses to the midpoint of the
/// shared edge when they only touch.
fn contact_center(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Vec2 {
    let lo = (c0 - h0).max(c1 - h1);
    let hi = (c0 + h0).min(c1 + h1);
    (lo + hi) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_aabb_aabb_basic() {
        let o = Narrowphase::overlap_aabb_aabb(Vec2::ZERO, Vec2::ONE, Vec2::new(1.5, 0.0), Vec2::ONE).unwrap();
        assert!((o.depth - 0.5).abs() < 1e-6);
        assert_eq!(o.normal, Vec2::new(-1.0, 0.0));
        assert!((o.contact.x - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_overlap_aabb_aabb_separated() {
        assert!(Narrowphase::overlap_aabb_aabb(Vec2::ZERO, Vec2::ONE, Vec2::new(3.1, 0.0), Vec2::ONE).is_none());
    }

    #[test]
    fn test_ray_aabb_hit() {
        let hit = Narrowphase::ray_aabb(Vec2::new(-5.0, 0.0), Vec2::X, Vec2::splat(-1.0), Vec2::ONE).unwrap();
        assert!((hit.toi - 4.0).abs() < 1e-5);
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
        assert!((hit.point.x + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_aabb_parallel_miss() {
        assert!(Narrowphase::ray_aabb(Vec2::new(-5.0, 2.0), Vec2::X, Vec2::splat(-1.0), Vec2::ONE).is_none());
    }

    #[test]
    fn test_ray_aabb_behind_misses() {
        assert!(Narrowphase::ray_aabb(Vec2::new(5.0, 0.0), Vec2::X, Vec2::splat(-1.0), Vec2::ONE).is_none());
    }

    #[test]
    fn test_ray_aabb_leaving_face_is_not_a_hit() {
        // Origin on the top face moving up
        assert!(Narrowphase::ray_aabb(Vec2::new(0.0, 1.0), Vec2::Y, Vec2::splat(-1.0), Vec2::ONE).is_none());
    }

    #[test]
    fn test_ray_aabb_entering_from_face_hits_at_zero() {
        let hit = Narrowphase::ray_aabb(Vec2::new(0.0, 1.0), -Vec2::Y, Vec2::splat(-1.0), Vec2::ONE).unwrap();
        assert_eq!(hit.toi, 0.0);
        assert_eq!(hit.normal, Vec2::Y);
    }

    #[test]
    fn test_ray_aabb_inside_has_zero_normal() {
        let hit = Narrowphase::ray_aabb(Vec2::ZERO, Vec2::X, Vec2::splat(-1.0), Vec2::ONE).unwrap();
        assert_eq!(hit.toi, 0.0);
        assert_eq!(hit.normal, Vec2::ZERO);
    }

    #[test]
    fn test_segment_aabb_hit_and_miss() {
        let min = Vec2::splat(-1.0);
        let max = Vec2::ONE;
        let hit = Narrowphase::line_segment_aabb(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0), min, max).unwrap();
        assert!((hit.toi - 0.25).abs() < 1e-6);
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
        // Stops short of the box
        assert!(Narrowphase::line_segment_aabb(Vec2::new(-4.0, 0.0), Vec2::new(-2.0, 0.0), min, max).is_none());
    }

    #[test]
    fn test_sweep_aabb_aabb_head_on() {
        let hit = Narrowphase::sweep_aabb_aabb(
            Vec2::new(-3.0, 0.0),
            Vec2::ONE,
            Vec2::new(5.0, 0.0),
            Vec2::ZERO,
            Vec2::ONE,
        )
        .unwrap();
        assert!((hit.toi - 0.2).abs() < 1e-5);
        assert_eq!(hit.normal, Vec2::new(-1.0, 0.0));
        assert!((hit.contact.x + 1.0).abs() < 1e-5);
        assert!(hit.contact.y.abs() < 1e-5);
    }

    #[test]
    fn test_sweep_contact_is_middle_of_shared_edge() {
        // Box half on top of a wider box, falling onto it
        let hit = Narrowphase::sweep_aabb_aabb(
            Vec2::new(0.75, 2.0),
            Vec2::splat(0.5),
            Vec2::new(0.0, -2.0),
            Vec2::ZERO,
            Vec2::splat(1.0),
        )
        .unwrap();
        assert!((hit.toi - 0.25).abs() < 1e-5);
        assert_eq!(hit.normal, Vec2::Y);
        assert!((hit.contact - Vec2::new(0.625, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_sweep_too_short_misses() {
        assert!(Narrowphase::sweep_aabb_aabb(
            Vec2::new(-3.0, 0.0),
            Vec2::ONE,
            Vec2::new(0.5, 0.0),
            Vec2::ZERO,
            Vec2::ONE,
        )
        .is_none());
    }
}
