//! Narrow-phase resolution: turns broad-phase candidates into per-axis
//! velocity corrections.
//!
//! Each candidate is re-cast along the body's current (possibly already
//! corrected) velocity, its contact normal is estimated and snapped to a
//! cardinal, and the penetration along that single axis is removed from the
//! velocity. Candidates are visited in the order given, so earlier tiles
//! shape what later ones see.

use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::collider::BoxCollider;
use crate::config::ResolverConfig;
use crate::contact::estimate_contact_normal;
use crate::diagnostics::{DiagnosticsSink, TraceEvent};
use crate::narrowphase::Narrowphase;
use crate::types::*;

/// What one `resolve_step` call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveReport {
    pub passes: u32,
    pub corrections: usize,
    /// Candidates skipped as separated, grazing, degenerate or non-penetrating.
    pub skipped: usize,
    pub degenerate: usize,
    /// Candidates still overlapping the body's next position after the last pass.
    pub unresolved: usize,
}

enum Outcome {
    Corrected,
    Skipped,
    Degenerate,
}

#[derive(Clone, Debug, Default)]
pub struct Resolver {
    pub cfg: ResolverConfig,
}

impl Resolver {
    pub fn new(cfg: ResolverConfig) -> Self {
        Self { cfg }
    }

    /// Correct `body.velocity` against `candidates`, nearest first.
    ///
    /// Never fails: degenerate contacts are logged and skipped, and leftover
    /// penetration is reported rather than treated as an error.
    pub fn resolve_step(
        &self,
        body: &mut Body,
        candidates: &[TileCollision],
        sink: &mut dyn DiagnosticsSink,
    ) -> ResolveReport {
        let mut report = ResolveReport::default();
        if candidates.is_empty() {
            return report;
        }

        let shape = BoxCollider::new(body.half_extents);
        for _ in 0..self.cfg.max_passes.max(1) {
            report.passes += 1;
            let mut corrected = 0;
            for candidate in candidates {
                match self.resolve_candidate(&shape, body, &candidate.tile, sink) {
                    Outcome::Corrected => corrected += 1,
                    Outcome::Skipped => report.skipped += 1,
                    Outcome::Degenerate => {
                        report.skipped += 1;
                        report.degenerate += 1;
                    }
                }
            }
            report.corrections += corrected;
            if corrected == 0 {
                break;
            }
        }

        report.unresolved = self.count_unresolved(body, candidates);
        if report.unresolved > 0 {
            log::debug!(
                "could not resolve all collisions this frame ({} of {} still penetrating)",
                report.unresolved,
                candidates.len()
            );
            sink.emit(TraceEvent::Unresolved { count: report.unresolved });
        }
        report
    }

    fn resolve_candidate(
        &self,
        shape: &BoxCollider,
        body: &mut Body,
        tile: &Tile,
        sink: &mut dyn DiagnosticsSink,
    ) -> Outcome {
        let speed = body.velocity.length();
        let Some(hit) = shape.cast_tile(body.position, body.velocity, speed, tile) else {
            // Already separated by an earlier correction
            log::trace!("{}: no contact along corrected velocity", tile.id);
            return Outcome::Skipped;
        };
        sink.emit(TraceEvent::CastHit { tile: tile.id, point: hit.point, distance: hit.distance });

        let limit = self.cfg.proximity_factor * tile.aabb.width();
        if hit.point.distance(tile.aabb.center) > limit {
            log::trace!("{}: grazing contact at {} ignored", tile.id, hit.point);
            sink.emit(TraceEvent::GrazingSkipped { tile: tile.id, point: hit.point });
            return Outcome::Skipped;
        }

        let raw = match estimate_contact_normal(hit.point, tile, self.cfg.normal_probe_skin) {
            Ok(n) => n,
            Err(err) => {
                log::warn!("{err}; using a neutral normal");
                sink.emit(TraceEvent::DegenerateHit { tile: tile.id, point: hit.point });
                Vec2::ZERO
            }
        };
        let Some(normal) = CardinalNormal::snap(raw) else {
            return Outcome::Degenerate;
        };
        sink.emit(TraceEvent::NormalSnapped { tile: tile.id, raw, snapped: normal });

        let overlap = normal.penetration(body.next_position(), body.half_extents, &tile.aabb);
        if overlap <= 0.0 {
            return Outcome::Skipped;
        }
        body.velocity += normal.to_vec2() * overlap;
        sink.emit(TraceEvent::Correction { tile: tile.id, normal, overlap });
        Outcome::Corrected
    }

    fn count_unresolved(&self, body: &Body, candidates: &[TileCollision]) -> usize {
        let next = body.next_position();
        candidates
            .iter()
            .filter(|c| {
                Narrowphase::overlap_aabb_aabb(next, body.half_extents, c.tile.aabb.center, c.tile.aabb.half_extents)
                    .is_some_and(|o| o.depth > self.cfg.penetration_slop)
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::LevelApi;
    use crate::config::LevelConfig;
    use crate::desc::TileDesc;
    use crate::diagnostics::{NoopSink, RecordingSink};
    use crate::level::Level;

    fn level(a: &[TileDesc], s: &[TileDesc]) -> Level {
        let mut l = Level::new(LevelConfig::default());
        l.register_tiles(a, &[], s).unwrap();
        l
    }

    fn unit(key: u64, x: f32, y: f32) -> TileDesc {
        TileDesc::new(key, Vec2::new(x, y), Vec2::splat(0.5))
    }

    fn body(position: Vec2, velocity: Vec2) -> Body {
        Body { position, velocity, half_extents: Vec2::splat(0.5) }
    }

    fn step(l: &mut Level, r: &Resolver, b: &mut Body, sink: &mut dyn DiagnosticsSink) -> ResolveReport {
        let shape = BoxCollider::new(b.half_extents);
        let candidates = l.find_colliding_tiles(&shape, b.position, b.next_position()).to_vec();
        r.resolve_step(b, &candidates, sink)
    }

    #[test]
    fn test_stops_at_wall_face() {
        // Tile's left edge is 0.8 units ahead of the actor's right edge
        let mut l = level(&[], &[unit(1, 1.8, 0.0)]);
        let r = Resolver::default();
        let mut b = body(Vec2::ZERO, Vec2::new(1.0, 0.0));
        let report = step(&mut l, &r, &mut b, &mut NoopSink);
        assert_eq!(report.corrections, 1);
        assert_eq!(report.unresolved, 0);
        assert!((b.velocity.x - 0.8).abs() < 1e-5);
        assert_eq!(b.velocity.y, 0.0);
        let right_edge = b.next_position().x + 0.5;
        assert!(right_edge <= 1.3 + 1e-5);
    }

    #[test]
    fn test_landing_cancels_downward_velocity() {
        let mut l = level(&[], &[unit(1, 0.0, 0.0), unit(2, 1.0, 0.0)]);
        let r = Resolver::default();
        let mut b = body(Vec2::new(0.5, 1.2), Vec2::new(0.0, -0.5));
        let mut sink = RecordingSink::default();
        let report = step(&mut l, &r, &mut b, &mut sink);
        assert!(report.corrections >= 1);
        assert!((b.next_position().y - 1.0).abs() < 1e-5);
        assert_eq!(b.velocity.x, 0.0);
        assert!(sink.events.iter().any(|e| matches!(e, TraceEvent::Correction { normal: CardinalNormal::Up, .. })));
    }

    #[test]
    fn test_walking_on_floor_keeps_horizontal_speed() {
        let mut l = level(&[], &[unit(1, 0.0, 0.0), unit(2, 1.0, 0.0), unit(3, 2.0, 0.0)]);
        let r = Resolver::default();
        let mut b = body(Vec2::new(0.0, 1.0), Vec2::new(0.2, -0.02));
        step(&mut l, &r, &mut b, &mut NoopSink);
        assert!((b.velocity.x - 0.2).abs() < 1e-6);
        assert!(b.velocity.y.abs() < 1e-5);
    }

    #[test]
    fn test_second_candidate_already_separated_is_skipped() {
        // Two stacked floor tiles; once the top one stops the fall the lower one
        // is no longer reached.
        let mut l = level(&[], &[unit(1, 0.0, 0.0), unit(2, 0.0, -1.0)]);
        let r = Resolver::default();
        let mut b = body(Vec2::new(0.0, 1.5), Vec2::new(0.0, -2.0));
        let report = step(&mut l, &r, &mut b, &mut NoopSink);
        assert_eq!(report.corrections, 1);
        assert_eq!(report.skipped, 1);
        assert!((b.next_position().y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_corner_graze_is_ignored() {
        // Sliding right along the top of a tile's corner
        let mut l = level(&[], &[unit(1, 1.0, 0.0)]);
        let r = Resolver::default();
        let mut b = body(Vec2::new(0.0, 1.0), Vec2::new(0.5, 0.0));
        let mut sink = RecordingSink::default();
        let report = step(&mut l, &r, &mut b, &mut sink);
        assert_eq!(report.corrections, 0);
        assert_eq!(report.unresolved, 0);
        assert!(sink.events.iter().any(|e| matches!(e, TraceEvent::GrazingSkipped { .. })));
        assert_eq!(b.velocity, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_degenerate_contact_is_contained() {
        // Body already buried deep inside the tile
        let mut l = level(&[], &[unit(1, 0.3, 0.0)]);
        let r = Resolver::default();
        let mut b = body(Vec2::new(0.1, 0.0), Vec2::new(0.1, 0.0));
        let mut sink = RecordingSink::default();
        let report = step(&mut l, &r, &mut b, &mut sink);
        assert_eq!(report.degenerate, 1);
        assert_eq!(report.corrections, 0);
        assert_eq!(report.unresolved, 1);
        assert_eq!(b.velocity, Vec2::new(0.1, 0.0));
        assert!(sink.events.iter().any(|e| matches!(e, TraceEvent::DegenerateHit { .. })));
        assert!(sink.events.iter().any(|e| matches!(e, TraceEvent::Unresolved { count: 1 })));
    }

    #[test]
    fn test_extra_passes_stop_when_nothing_changes() {
        let mut l = level(&[], &[unit(1, 2.0, 0.0)]);
        let r = Resolver::new(ResolverConfig { max_passes: 4, ..ResolverConfig::default() });
        let mut b = body(Vec2::ZERO, Vec2::new(1.5, 0.0));
        let report = step(&mut l, &r, &mut b, &mut NoopSink);
        assert_eq!(report.passes, 2);
        assert_eq!(report.corrections, 1);
        assert_eq!(b.velocity.x, 1.0);
    }

    #[test]
    fn test_sink_does_not_change_result() {
        let tiles = [unit(1, 1.0, 0.0), unit(2, 1.0, 1.0), unit(3, 0.0, -1.0), unit(4, 1.0, -1.0)];
        let r = Resolver::default();
        let start = body(Vec2::new(-0.2, 0.1), Vec2::new(0.5, -0.4));

        let mut quiet = start;
        step(&mut level(&[], &tiles), &r, &mut quiet, &mut NoopSink);
        let mut traced = start;
        step(&mut level(&[], &tiles), &r, &mut traced, &mut RecordingSink::default());
        assert_eq!(quiet, traced);
    }
}
